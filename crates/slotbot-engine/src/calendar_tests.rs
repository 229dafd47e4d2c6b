use super::*;
use crate::testutil::{FakeSite, cell, month_of};
use chrono::Duration as ChronoDuration;

fn tuning() -> EngineTuning {
    EngineTuning::fast()
}

fn markers() -> SiteMarkers {
    SiteMarkers::default()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[test]
fn classify_distinguishes_all_three_states() {
    let m = markers();
    assert_eq!(classify("...", &m), ContentState::Placeholder);
    assert_eq!(classify("", &m), ContentState::Placeholder);
    assert_eq!(
        classify("при запросе к серверу произошла ошибка", &m),
        ContentState::RemoteError
    );
    assert_eq!(classify("14:00 15:00", &m), ContentState::Content);
}

#[test]
fn displayed_month_ignores_unselectable_cells() {
    let cells = vec![cell(2026, 7, 31, false), cell(2026, 8, 1, true)];
    assert_eq!(displayed_month(&cells), Some((2026, 8)));
    assert_eq!(displayed_month(&cells[..1]), None);
}

#[test]
fn tolerate_timeout_passes_other_errors() {
    assert!(tolerate_timeout::<()>(Err(EngineError::timeout("x"))).is_ok());
    assert!(tolerate_timeout::<()>(Err(EngineError::stale("x"))).is_err());
    assert!(tolerate_timeout(Ok(1)).is_ok());
}

#[tokio::test]
async fn clicks_target_in_current_month() {
    let site = FakeSite::new();
    let target = today();
    site.with(|s| {
        s.months = vec![month_of(target)];
        s.slots_text_value = "14:00".into();
    });

    navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap();

    let clicked = site.with(|s| s.clicked_days.clone());
    assert_eq!(clicked.len(), 1);
}

#[tokio::test]
async fn pages_forward_to_a_future_month() {
    let target = today() + ChronoDuration::days(60);
    let site = FakeSite::new();
    site.with(|s| {
        s.months = vec![month_of(today()), month_of(today() + ChronoDuration::days(30)), month_of(target)];
        s.slots_text_value = "14:00".into();
    });

    navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap();

    let (clicked, pages) = site.with(|s| (s.clicked_days.len(), s.page_events));
    assert_eq!(clicked, 1);
    assert!(pages >= 1, "expected at least one forward page");
}

#[tokio::test]
async fn pages_back_when_view_overshoots() {
    let target = today();
    let site = FakeSite::new();
    site.with(|s| {
        s.months = vec![month_of(target), month_of(target + ChronoDuration::days(40))];
        s.month_index = 1;
        s.slots_text_value = "14:00".into();
    });

    navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap();

    assert_eq!(site.with(|s| s.clicked_days.len()), 1);
}

#[tokio::test]
async fn stale_cell_clicks_are_retried() {
    let site = FakeSite::new();
    let target = today();
    site.with(|s| {
        s.months = vec![month_of(target)];
        s.stale_cell_clicks = 3;
        s.slots_text_value = "14:00".into();
    });

    navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap();

    assert_eq!(site.with(|s| s.clicked_days.len()), 1);
}

#[tokio::test]
async fn unreachable_date_exhausts_the_budget_and_raises() {
    let site = FakeSite::new();
    let target = today() + ChronoDuration::days(200);
    // Only the current month is ever rendered; the target never appears.
    site.with(|s| {
        s.months = vec![month_of(today())];
    });

    let err = navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Logic { .. }));

    // Paging happened on every attempt, bounded by the budget.
    let pages = site.with(|s| s.page_events);
    assert_eq!(pages, tuning().max_nav_attempts);
}

#[tokio::test]
async fn dates_outside_the_window_are_rejected() {
    let site = FakeSite::new();
    let err = navigate_to_date(
        site.as_ref(),
        &markers(),
        &tuning(),
        today() + ChronoDuration::days(MAX_DAYS_AHEAD + 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Logic { .. }));

    let err = navigate_to_date(
        site.as_ref(),
        &markers(),
        &tuning(),
        today() - ChronoDuration::days(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Logic { .. }));
}

#[tokio::test]
async fn unselectable_target_cell_is_never_clicked() {
    let site = FakeSite::new();
    let target = today();
    site.with(|s| {
        // The target day is rendered but disabled; another selectable day
        // keeps the view readable.
        let other = if target.day() == 1 { 2 } else { 1 };
        s.months = vec![vec![
            cell(target.year(), target.month(), target.day(), false),
            cell(target.year(), target.month(), other, true),
        ]];
    });

    let err = navigate_to_date(site.as_ref(), &markers(), &tuning(), target)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Logic { .. }));
    assert!(site.with(|s| s.clicked_days.is_empty()));
}
