//! Slot discovery: open, select, navigate, vote.

use chrono::NaiveDate;
use slotbot_config::SiteMarkers;
use slotbot_protocols::{EngineError, TimesResult};
use tracing::{debug, warn};

use crate::calendar;
use crate::poll;
use crate::probe::text;
use crate::selector;
use crate::site::SitePage;
use crate::tuning::EngineTuning;
use crate::vote;

/// Fetch bookable times for (room, service set, date).
pub async fn fetch_slots(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    room_url: &str,
    service_ids: &[String],
    date: NaiveDate,
) -> Result<TimesResult, EngineError> {
    page.open(room_url).await?;
    prepare_slot_view(page, tuning, service_ids).await?;

    for attempt in 0..tuning.date_attempts {
        calendar::navigate_to_date(page, markers, tuning, date).await?;

        if text::is_server_error(&page.slots_text().await?, markers) {
            // The remote failed this query; back off with an increasing
            // delay and click the date again.
            let backoff = tuning.date_backoff_base + tuning.date_backoff_step * attempt as u32;
            warn!("server error in slot container, attempt {attempt}, backing off");
            tokio::time::sleep(backoff).await;
            continue;
        }

        let times = vote::sample_times(page, markers, tuning.vote).await?;
        if !times.is_empty() {
            tokio::time::sleep(tuning.pre_confirm_pause).await;
            let confirmed = vote::sample_times(page, markers, tuning.confirm_vote).await?;
            let final_times = if confirmed.is_empty() { times } else { confirmed };
            return Ok(TimesResult::ok(final_times));
        }

        if !text::is_placeholder(&page.slots_text().await?) {
            // Real content with zero extractable times: the day is booked out.
            return Ok(TimesResult::Empty);
        }

        tokio::time::sleep(tuning.placeholder_pause).await;
    }

    // Still inconclusive: one full reload + re-select + re-navigate before
    // giving up.
    debug!("slot discovery inconclusive, falling back to full page reload");
    page.reload().await?;
    prepare_slot_view(page, tuning, service_ids).await?;
    calendar::navigate_to_date(page, markers, tuning, date).await?;

    if text::is_server_error(&page.slots_text().await?, markers) {
        return Ok(TimesResult::error("Ошибка сервера при получении слотов"));
    }

    let times = vote::sample_times(page, markers, tuning.fallback_vote).await?;
    if times.is_empty() {
        Ok(TimesResult::Empty)
    } else {
        Ok(TimesResult::ok(times))
    }
}

/// Select services and open the calendar: shared between discovery,
/// booking and the reload fallback.
pub(crate) async fn prepare_slot_view(
    page: &dyn SitePage,
    tuning: &EngineTuning,
    service_ids: &[String],
) -> Result<(), EngineError> {
    selector::select_services(page, tuning, service_ids).await?;

    poll::wait_for(
        "choose-time control",
        tuning.poll(tuning.choose_time_timeout),
        || page.click_choose_time(),
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => {
            EngineError::logic("Кнопка 'Выбрать время' не появилась.")
        }
        other => other,
    })?;

    poll::wait_for(
        "calendar widget",
        tuning.poll(tuning.calendar_visible_timeout),
        || page.calendar_visible(),
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => EngineError::logic("Календарь не появился."),
        other => other,
    })
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
