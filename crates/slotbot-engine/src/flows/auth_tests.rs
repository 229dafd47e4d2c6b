use std::sync::Arc;

use super::*;
use crate::testutil::FakeSite;
use crate::tuning::EngineTuning;

fn markers() -> SiteMarkers {
    SiteMarkers::default()
}

/// A site where the login modal works and submission closes it.
fn login_site() -> Arc<FakeSite> {
    let site = FakeSite::new();
    site.with(|s| {
        s.login_button = true;
        s.register_button = true;
        s.fields_present = true;
        s.submit_closes_modal = true;
    });
    site
}

fn lock_all_records(site: &FakeSite, m: &SiteMarkers) {
    site.with(|s| {
        for url in &m.records_urls {
            s.auth_required_urls.insert(url.clone());
        }
    });
}

#[tokio::test]
async fn login_verified_through_protected_resource() {
    let site = login_site();

    let result = login(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap();

    assert!(result.ok);
    assert!(result.verified_records);
    // Credentials actually reached the form.
    let filled = site.with(|s| s.filled_fields.clone());
    assert!(filled.contains(&("phone".to_string(), "+79990001122".to_string())));
}

#[tokio::test]
async fn closed_modal_without_verified_access_is_not_success() {
    // Scenario E: the modal closes cleanly but every protected URL still
    // demands authentication — the UI's claim of success is not trusted.
    let m = markers();
    let site = login_site();
    lock_all_records(&site, &m);

    let result = login(
        site.as_ref(),
        &m,
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap();

    assert!(!result.ok);
    assert!(!result.verified_records);
    assert!(result.message.contains("не подтверждён"));
}

#[tokio::test]
async fn inline_error_fails_fast() {
    let site = login_site();
    site.with(|s| {
        s.inline_error = Some("Неверный пароль".into());
    });

    let result = login(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "+79990001122",
        "wrong",
    )
    .await
    .unwrap();

    assert!(!result.ok);
    assert_eq!(result.message, "Неверный пароль");
}

#[tokio::test]
async fn stuck_modal_is_reported() {
    let site = login_site();
    site.with(|s| s.submit_closes_modal = false);

    let result = login(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap();

    assert!(!result.ok);
    assert!(result.message.contains("не закрылось"));
}

#[tokio::test]
async fn already_logged_in_short_circuits_when_verified() {
    let site = login_site();
    site.with(|s| s.logged_in = true);

    let result = login(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap();

    assert!(result.ok && result.verified_records);
    // No modal interaction was needed.
    assert!(site.with(|s| s.filled_fields.is_empty()));
}

#[tokio::test]
async fn lying_logged_in_indicator_falls_through_to_login() {
    let m = markers();
    let site = login_site();
    site.with(|s| s.logged_in = true);
    lock_all_records(&site, &m);

    let result = login(
        site.as_ref(),
        &m,
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap();

    // The indicator claimed a session, verification said otherwise, the
    // full login ran and still could not be verified.
    assert!(!result.ok);
    assert!(!site.with(|s| s.filled_fields.is_empty()));
}

#[tokio::test]
async fn missing_login_button_is_a_logic_failure() {
    let site = FakeSite::new();

    let err = login(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "+79990001122",
        "secret",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Logic { .. }));
    assert!(err.to_string().contains("входа"));
}

#[tokio::test]
async fn registration_reports_presumed_unverified_success() {
    let site = login_site();

    let result = register(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "Иван",
        "+79990001122",
        "secret",
        "secret",
    )
    .await
    .unwrap();

    assert!(result.ok);
    assert!(!result.verified_records);
}

#[tokio::test]
async fn registration_inline_error_is_a_failure() {
    let site = login_site();
    site.with(|s| {
        s.inline_error = Some("Телефон уже зарегистрирован".into());
    });

    let result = register(
        site.as_ref(),
        &markers(),
        &EngineTuning::fast(),
        "Иван",
        "+79990001122",
        "secret",
        "secret",
    )
    .await
    .unwrap();

    assert!(!result.ok);
    assert!(result.message.contains("зарегистрирован"));
}
