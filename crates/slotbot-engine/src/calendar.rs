//! Calendar navigator: bounded search over a paginated month view.
//!
//! The widget offers only relative paging controls, so reaching a target
//! date is a search: look for the day cell in the rendered month, click it
//! if present, otherwise read the displayed month and page toward the
//! target. Every loop is bounded; exhausting the budget is fatal for the
//! calling flow.

use chrono::{Datelike, NaiveDate, Utc};
use slotbot_protocols::EngineError;
use tracing::debug;

use crate::poll::{self, ContentState};
use crate::probe::text;
use crate::site::{CalendarCell, CalendarPaging, SitePage};
use crate::tuning::EngineTuning;
use slotbot_config::SiteMarkers;

/// How far into the future a target date may lie.
pub const MAX_DAYS_AHEAD: i64 = 365;

/// Navigate to `target` and activate its day cell, then give the slot
/// container its stabilization sequence.
pub async fn navigate_to_date(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    target: NaiveDate,
) -> Result<(), EngineError> {
    let today = Utc::now().date_naive();
    let ahead = (target - today).num_days();
    if !(0..=MAX_DAYS_AHEAD).contains(&ahead) {
        return Err(EngineError::logic(format!(
            "Дата {target} вне допустимого диапазона"
        )));
    }

    wait_cells(page, tuning).await?;
    let baseline = page.slots_fragment().await?;

    for attempt in 0..tuning.max_nav_attempts {
        let cells = page.calendar_cells().await?;
        let found = cells
            .iter()
            .find(|c| c.selectable && matches_date(c, target))
            .cloned();

        if let Some(cell) = found {
            if click_cell_with_retries(page, tuning, &cell, target).await? {
                stabilize_slots(page, markers, tuning, &baseline).await?;
                return Ok(());
            }
            // The cell vanished mid-retry; re-render and search again.
            continue;
        }

        // Target not rendered: compare the displayed month and page toward
        // it. An unreadable view (no selectable cell) pages forward blindly.
        match displayed_month(&cells) {
            None => {
                debug!("calendar view unreadable on attempt {attempt}, paging forward");
                page.page_calendar(CalendarPaging::Forward).await?;
            }
            Some((year, month)) => {
                let direction = if (target.year(), target.month()) > (year, month) {
                    CalendarPaging::Forward
                } else {
                    CalendarPaging::Back
                };
                page.page_calendar(direction).await?;
            }
        }
        wait_cells(page, tuning).await?;
    }

    Err(EngineError::logic("Не удалось выбрать дату в календаре."))
}

fn matches_date(cell: &CalendarCell, target: NaiveDate) -> bool {
    cell.year == target.year() && cell.month == target.month() && cell.day == target.day()
}

/// (year, month) of the first selectable rendered cell.
fn displayed_month(cells: &[CalendarCell]) -> Option<(i32, u32)> {
    cells
        .iter()
        .find(|c| c.selectable)
        .map(|c| (c.year, c.month))
}

async fn wait_cells(page: &dyn SitePage, tuning: &EngineTuning) -> Result<(), EngineError> {
    poll::wait_for("calendar day cells", tuning.poll(tuning.cells_timeout), || {
        let fut = page.calendar_cells();
        async move { Ok(!fut.await?.is_empty()) }
    })
    .await
}

/// Click one day cell, absorbing staleness with bounded re-resolution.
/// `Ok(false)` means the cell disappeared and the caller should re-search.
async fn click_cell_with_retries(
    page: &dyn SitePage,
    tuning: &EngineTuning,
    cell: &CalendarCell,
    target: NaiveDate,
) -> Result<bool, EngineError> {
    for _ in 0..tuning.max_cell_click_retries {
        match page.click_cell(cell).await {
            Ok(true) => return Ok(true),
            Ok(false) => return Ok(false),
            Err(e) if matches!(e, EngineError::Stale { .. }) => {
                debug!("stale click on day cell {target}, re-resolving");
                tokio::time::sleep(tuning.stale_retry_pause).await;
                let still_there = page
                    .calendar_cells()
                    .await?
                    .iter()
                    .any(|c| c.selectable && matches_date(c, target));
                if !still_there {
                    return Ok(false);
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Post-click stabilization: change, quiet period, then content-or-error.
/// Each stage is best-effort — a timeout moves on to the next stage, any
/// other failure aborts.
async fn stabilize_slots(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    baseline: &str,
) -> Result<(), EngineError> {
    let changed = poll::wait_changed(
        "slot container change",
        tuning.poll(tuning.changed_timeout),
        baseline,
        || page.slots_fragment(),
    )
    .await;
    tolerate_timeout(changed)?;

    let stable = poll::wait_stable(
        "slot container stability",
        tuning.poll(tuning.stable_timeout),
        tuning.stable_for,
        || page.slots_fragment(),
    )
    .await;
    tolerate_timeout(stable)?;

    let ready = poll::wait_content_or_error(
        "slot container content",
        tuning.poll(tuning.ready_timeout),
        || {
            let fut = page.slots_text();
            async move {
                let text_now = fut.await?;
                Ok(classify(&text_now, markers))
            }
        },
    )
    .await;
    tolerate_timeout(ready)?;

    Ok(())
}

/// Classify the slot container text for the content-or-error wait.
pub fn classify(text_now: &str, markers: &SiteMarkers) -> ContentState {
    if text::is_server_error(text_now, markers) {
        ContentState::RemoteError
    } else if text::is_placeholder(text_now) {
        ContentState::Placeholder
    } else {
        ContentState::Content
    }
}

fn tolerate_timeout<T>(result: Result<T, EngineError>) -> Result<(), EngineError> {
    match result {
        Ok(_) => Ok(()),
        Err(EngineError::Timeout { what }) => {
            debug!("best-effort wait timed out: {what}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
