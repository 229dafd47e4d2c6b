//! Booking submission: one independent attempt per requested slot.

use chrono::NaiveDate;
use slotbot_config::SiteMarkers;
use slotbot_protocols::{BookingAttempt, EngineError};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::calendar;
use crate::poll::{self, ContentState};
use crate::probe::text;
use crate::site::SitePage;
use crate::tuning::EngineTuning;

use super::slots::prepare_slot_view;

/// Book every requested slot, one attempt each.
///
/// Attempts are fully isolated: each reopens the page, reselects the
/// services and renavigates to the date, and any failure — including a
/// driver fault — becomes that slot's failed attempt. This function never
/// errors as a whole; one dead slot must not abort the rest.
pub async fn book_slots(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    room_url: &str,
    service_ids: &[String],
    date: NaiveDate,
    times: &[String],
    comment: &str,
) -> Vec<BookingAttempt> {
    let mut attempts = Vec::with_capacity(times.len());

    for time in times {
        let result =
            attempt_slot(page, markers, tuning, room_url, service_ids, date, time, comment).await;
        attempts.push(match result {
            Ok(message) => BookingAttempt::succeeded(time, message),
            Err(e) => {
                warn!("booking attempt for {time} failed: {e}");
                BookingAttempt::failed(time, e.to_string())
            }
        });
    }

    attempts
}

#[allow(clippy::too_many_arguments)]
async fn attempt_slot(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
    room_url: &str,
    service_ids: &[String],
    date: NaiveDate,
    time: &str,
    comment: &str,
) -> Result<String, EngineError> {
    page.open(room_url).await?;
    prepare_slot_view(page, tuning, service_ids).await?;
    calendar::navigate_to_date(page, markers, tuning, date).await?;

    // The slot list must be real content before the target control is
    // trusted to exist.
    let state = poll::wait_content_or_error(
        "slot container content",
        tuning.poll(tuning.ready_timeout),
        || {
            let fut = page.slots_text();
            async move {
                let text_now = fut.await?;
                Ok(calendar::classify(&text_now, markers))
            }
        },
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => EngineError::logic("Слоты не загрузились."),
        other => other,
    })?;
    if state == ContentState::RemoteError {
        return Err(EngineError::remote("Ошибка сервера при загрузке слотов"));
    }

    poll::wait_for(
        "slot control",
        tuning.poll(tuning.slot_click_timeout),
        || page.click_slot(time),
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => EngineError::logic(format!("Слот {time} не найден.")),
        other => other,
    })?;

    page.expand_comment_box().await?;

    if !page.fill_comment(comment).await? {
        return Err(EngineError::logic("Поле для комментария не найдено."));
    }
    // "We filled it" is not "it holds the text": re-read before submitting.
    if !page.comment_contains(comment).await? {
        return Err(EngineError::logic("Комментарий не сохранился в поле."));
    }

    poll::wait_for(
        "submit control",
        tuning.poll(tuning.submit_timeout),
        || page.click_submit(),
    )
    .await
    .map_err(|e| match e {
        EngineError::Timeout { .. } => {
            EngineError::logic("Кнопка подтверждения записи недоступна.")
        }
        other => other,
    })?;

    watch_outcome(page, markers, tuning).await
}

/// Watch the page for a fixed window for a success or failure fragment.
async fn watch_outcome(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    tuning: &EngineTuning,
) -> Result<String, EngineError> {
    let deadline = Instant::now() + tuning.outcome_watch;

    loop {
        let page_text = page.page_text().await?;
        if text::contains_any(&page_text, &markers.booking_success_fragments) {
            debug!("booking confirmed by page text");
            return Ok("Запись создана.".to_string());
        }
        if text::contains_any(&page_text, &markers.booking_failure_fragments) {
            return Err(EngineError::logic(
                "Сайт сообщил об ошибке при создании записи.",
            ));
        }
        if Instant::now() >= deadline {
            return Err(EngineError::logic("Нет подтверждения создания записи."));
        }
        tokio::time::sleep(tuning.outcome_poll).await;
    }
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
