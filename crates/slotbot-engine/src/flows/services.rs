//! Service catalog extraction.

use std::collections::HashSet;

use slotbot_config::SiteMarkers;
use slotbot_protocols::{EngineError, ServiceItem};

use crate::poll;
use crate::probe::text;
use crate::site::SitePage;
use crate::tuning::EngineTuning;

/// Open the room page and extract its deduplicated service catalog.
pub async fn fetch_services(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    room_url: &str,
) -> Result<Vec<ServiceItem>, EngineError> {
    page.open(room_url).await?;

    poll::wait_for(
        "service catalog controls",
        tuning.poll(tuning.services_present_timeout),
        || {
            let fut = page.service_count();
            async move { Ok(fut.await? > 0) }
        },
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => EngineError::logic("Список услуг не загрузился."),
        other => other,
    })?;

    let rows = page.service_rows().await?;

    let mut seen = HashSet::new();
    let mut services = Vec::new();
    for row in rows {
        let id = text::clean_spaces(&row.id);
        if id.is_empty() || seen.contains(&id) {
            continue;
        }

        let mut title = text::tidy_service_title(&row.name, &row.duration, &row.cost, markers);
        if title.is_empty() {
            title = text::short_raw_fallback(&row.raw, markers);
        }

        if !title.is_empty() {
            seen.insert(id.clone());
            services.push(ServiceItem { id, title });
        }
    }

    Ok(services)
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
