//! My-records retrieval over the protected records page.

use slotbot_config::SiteMarkers;
use slotbot_protocols::{EngineError, RecordsResult};

use crate::site::SitePage;

/// Probe the locale-variant records URLs; extract reservation summaries
/// from the first one that does not demand authentication.
pub async fn fetch_records(
    page: &dyn SitePage,
    markers: &SiteMarkers,
) -> Result<RecordsResult, EngineError> {
    for url in &markers.records_urls {
        page.open(url).await?;
        if page.auth_required().await? {
            continue;
        }

        let records = page.record_blocks().await?;
        let message = if records.is_empty() {
            "Записей не найдено.".to_string()
        } else {
            format!("Найдено записей: {}.", records.len())
        };
        return Ok(RecordsResult {
            ok: true,
            records,
            message,
        });
    }

    Ok(RecordsResult {
        ok: false,
        records: Vec::new(),
        message: "Требуется вход: доступ к записям не получен.".to_string(),
    })
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
