//! Service selector: idempotent clear-then-select protocol.
//!
//! Phase one unconditionally clears every active control; phase two
//! activates each target id with bounded stale retries; afterwards the
//! selection is verified against the live document. "We told the UI to
//! select" and "the UI confirms selection" are different facts — only the
//! verification wait concludes the protocol.

use slotbot_protocols::EngineError;
use tracing::debug;

use crate::poll;
use crate::site::SitePage;
use crate::tuning::EngineTuning;

/// Clear all selections, activate exactly `service_ids`, verify.
pub async fn select_services(
    page: &dyn SitePage,
    tuning: &EngineTuning,
    service_ids: &[String],
) -> Result<(), EngineError> {
    page.clear_service_selection().await?;
    tokio::time::sleep(tuning.post_clear_pause).await;

    for service_id in service_ids {
        activate_with_retries(page, tuning, service_id).await?;
        tokio::time::sleep(tuning.service_click_pause).await;
    }

    poll::wait_for(
        "service selection confirmation",
        tuning.poll(tuning.selection_verify_timeout),
        || page.services_selected(service_ids),
    )
    .await
}

async fn activate_with_retries(
    page: &dyn SitePage,
    tuning: &EngineTuning,
    service_id: &str,
) -> Result<(), EngineError> {
    for _ in 0..tuning.max_service_click_retries {
        match page.activate_service(service_id).await {
            Ok(()) => return Ok(()),
            Err(EngineError::Stale { what }) => {
                debug!("stale service control {service_id} ({what}), re-resolving");
                tokio::time::sleep(tuning.stale_retry_pause).await;
            }
            Err(e) => return Err(e),
        }
    }
    Err(EngineError::logic(format!(
        "Не удалось выбрать услугу {service_id}."
    )))
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
