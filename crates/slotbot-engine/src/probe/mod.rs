//! DOM probe layer: the only module that knows what the remote site's
//! markup looks like.
//!
//! Read operations return plain structured data validated at this
//! boundary — malformed rows are logged and dropped, never propagated.
//! Write operations attempt a direct (trusted-input) interaction first and
//! fall back to a scripted one when the direct path fails for any reason
//! other than staleness; staleness is always re-raised so the caller's
//! retry loop can re-resolve the element.

pub mod scripts;
pub mod text;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use serde_json::Value;
use slotbot_config::SiteMarkers;
use slotbot_protocols::EngineError;
use tracing::debug;

use crate::cdp::{CdpError, PageSession, RemoteObject};
use crate::poll::{self, Poll};
use crate::site::{CalendarCell, CalendarPaging, ServiceRow, SitePage};

/// Per-item line cap for extracted records.
const RECORD_MAX_LINES: usize = 6;
/// Total cap on extracted records.
const RECORD_MAX_ITEMS: usize = 20;
/// Truncated-text key length for record deduplication.
const RECORD_DEDUP_KEY: usize = 80;

/// Marker-driven probe over one CDP page session.
pub struct DomProbe {
    page: Arc<PageSession>,
    markers: Arc<SiteMarkers>,
}

impl DomProbe {
    pub fn new(page: Arc<PageSession>, markers: Arc<SiteMarkers>) -> Self {
        Self { page, markers }
    }

    async fn eval(&self, script: &str) -> Result<Value, EngineError> {
        Ok(self.page.evaluate(script).await?)
    }

    async fn eval_bool(&self, script: &str) -> Result<bool, EngineError> {
        Ok(self.eval(script).await?.as_bool().unwrap_or(false))
    }

    async fn eval_string(&self, script: &str) -> Result<String, EngineError> {
        Ok(self
            .eval(script)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Resolve an expression to an element handle, `None` when it yields
    /// null/undefined.
    async fn resolve(&self, script: &str) -> Result<Option<RemoteObject>, EngineError> {
        let obj = self.page.evaluate_handle(script).await?;
        Ok(obj.is_node().then_some(obj))
    }

    /// Direct interaction first, scripted fallback second, staleness
    /// re-raised.
    async fn robust_click(&self, object_id: &str) -> Result<(), EngineError> {
        match self.direct_click(object_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_stale() => Err(e.into()),
            Err(e) => {
                debug!("direct click failed ({}), falling back to scripted click", e);
                self.page
                    .call_on(object_id, scripts::SCRIPTED_CLICK, vec![])
                    .await?;
                Ok(())
            }
        }
    }

    /// Scroll into view and dispatch a trusted mouse click at the element
    /// center.
    async fn direct_click(&self, object_id: &str) -> Result<(), CdpError> {
        self.page
            .call_on(object_id, scripts::SCROLL_INTO_VIEW, vec![])
            .await?;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let model = self.page.box_model(object_id).await?.ok_or_else(|| {
            CdpError::JavaScript("element has no layout".to_string())
        })?;
        let (x, y) = model.content_center();
        self.page.mouse_click(x, y).await
    }

    /// Clear and fill a field: trusted keystrokes first, scripted value
    /// write as fallback. An empty value always goes the scripted route —
    /// inserting nothing clears nothing.
    async fn fill_field(&self, object_id: &str, value: &str) -> Result<(), EngineError> {
        if !value.is_empty() {
            match self.direct_fill(object_id, value).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_stale() => return Err(e.into()),
                Err(e) => {
                    debug!("direct fill failed ({}), falling back to scripted set", e);
                }
            }
        }
        self.page
            .call_on(
                object_id,
                scripts::SET_FIELD_VALUE,
                vec![Value::String(value.to_string())],
            )
            .await?;
        Ok(())
    }

    async fn direct_fill(&self, object_id: &str, value: &str) -> Result<(), CdpError> {
        self.page.focus(object_id).await?;
        self.page.select_all().await?;
        self.page.insert_text(value).await
    }

    async fn read_field(&self, object_id: &str) -> Result<String, EngineError> {
        let value = self
            .page
            .call_on(object_id, scripts::READ_FIELD_VALUE, vec![])
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Click the first enabled control matching any of the texts.
    async fn click_by_text(
        &self,
        texts: &[String],
        fallback_selector: Option<&str>,
    ) -> Result<bool, EngineError> {
        let script = scripts::find_control_by_text(texts, fallback_selector);
        match self.resolve(&script).await? {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.robust_click(id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fill_modal_input(
        &self,
        hints: &[String],
        input_type: Option<&str>,
        nth: usize,
        value: &str,
    ) -> Result<bool, EngineError> {
        let script = scripts::find_modal_input(&self.markers, hints, input_type, nth);
        match self.resolve(&script).await? {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.fill_field(id, value).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SitePage for DomProbe {
    async fn open(&self, url: &str) -> Result<(), EngineError> {
        self.page.navigate(url).await?;
        poll::wait_present("document body", Poll::new(Duration::from_secs(20)), || {
            let script = scripts::body_present();
            async move { Ok(self.eval_bool(&script).await?.then_some(())) }
        })
        .await
    }

    async fn reload(&self) -> Result<(), EngineError> {
        self.page.reload().await?;
        Ok(())
    }

    async fn page_text(&self) -> Result<String, EngineError> {
        self.eval_string(&scripts::page_text()).await
    }

    async fn service_count(&self) -> Result<usize, EngineError> {
        let count = self.eval(&scripts::service_count(&self.markers)).await?;
        Ok(count.as_u64().unwrap_or(0) as usize)
    }

    async fn service_rows(&self) -> Result<Vec<ServiceRow>, EngineError> {
        let value = self.eval(&scripts::service_rows(&self.markers)).await?;
        let rows = value.as_array().cloned().unwrap_or_default();

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row["id"].as_str().unwrap_or_default().trim().to_string();
            if id.is_empty() {
                debug!("dropping catalog row without a service id");
                continue;
            }
            out.push(ServiceRow {
                id,
                name: row["name"].as_str().unwrap_or_default().to_string(),
                duration: row["duration"].as_str().unwrap_or_default().to_string(),
                cost: row["cost"].as_str().unwrap_or_default().to_string(),
                raw: row["raw"].as_str().unwrap_or_default().to_string(),
            });
        }
        Ok(out)
    }

    async fn clear_service_selection(&self) -> Result<(), EngineError> {
        self.eval(&scripts::clear_services(&self.markers)).await?;
        Ok(())
    }

    async fn activate_service(&self, service_id: &str) -> Result<(), EngineError> {
        let input = self
            .resolve(&scripts::find_service_input(&self.markers, service_id))
            .await?
            .ok_or_else(|| EngineError::stale(format!("service control {service_id}")))?;
        let input_id = input.object_id.as_deref().unwrap_or_default();

        // Prefer the enclosing label: it carries the visual state and some
        // layouts cover the input entirely.
        let label = self
            .page
            .call_on_handle(input_id, "function() { return this.closest('label'); }")
            .await?;
        let click_target = if label.is_node() {
            label.object_id.as_deref().unwrap_or(input_id).to_string()
        } else {
            input_id.to_string()
        };
        self.robust_click(&click_target).await?;

        // The UI reacts to clicks inconsistently; force the final state and
        // notify listeners so verification observes the same thing the site
        // scripts do.
        self.page
            .call_on(input_id, scripts::FORCE_SERVICE_STATE, vec![])
            .await?;
        Ok(())
    }

    async fn services_selected(&self, service_ids: &[String]) -> Result<bool, EngineError> {
        self.eval_bool(&scripts::services_selected(&self.markers, service_ids))
            .await
    }

    async fn click_choose_time(&self) -> Result<bool, EngineError> {
        self.click_by_text(
            &self.markers.choose_time_texts,
            Some(&self.markers.choose_time_fallback_selector),
        )
        .await
    }

    async fn calendar_visible(&self) -> Result<bool, EngineError> {
        self.eval_bool(&scripts::element_visible(&self.markers.calendar_root))
            .await
    }

    async fn calendar_cells(&self) -> Result<Vec<CalendarCell>, EngineError> {
        let value = self.eval(&scripts::calendar_cells(&self.markers)).await?;
        let raw = value.as_array().cloned().unwrap_or_default();

        let mut out = Vec::with_capacity(raw.len());
        for entry in raw {
            let Some(ms) = entry["ms"].as_i64() else {
                debug!("dropping calendar cell without a timestamp");
                continue;
            };
            // Decode in UTC; local-time decoding shifts the date by one day
            // for users west of the site's timezone.
            let Some(date) = Utc.timestamp_millis_opt(ms).single() else {
                debug!("dropping calendar cell with unrepresentable timestamp {ms}");
                continue;
            };
            out.push(CalendarCell {
                ms,
                year: date.year(),
                month: date.month(),
                day: date.day(),
                selectable: entry["selectable"].as_bool().unwrap_or(false),
            });
        }
        Ok(out)
    }

    async fn click_cell(&self, cell: &CalendarCell) -> Result<bool, EngineError> {
        match self
            .resolve(&scripts::find_day_cell(&self.markers, cell.ms))
            .await?
        {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.robust_click(id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn page_calendar(&self, direction: CalendarPaging) -> Result<(), EngineError> {
        let forward = direction == CalendarPaging::Forward;
        let script = scripts::find_calendar_nav(&self.markers, forward);
        if let Some(obj) = self.resolve(&script).await? {
            let id = obj.object_id.as_deref().unwrap_or_default();
            self.robust_click(id).await?;
            tokio::time::sleep(Duration::from_millis(120)).await;
        }
        Ok(())
    }

    async fn slots_fragment(&self) -> Result<String, EngineError> {
        self.eval_string(&scripts::slots_fragment(&self.markers))
            .await
    }

    async fn slots_text(&self) -> Result<String, EngineError> {
        self.eval_string(&scripts::slots_text(&self.markers)).await
    }

    async fn extract_times(&self) -> Result<Vec<String>, EngineError> {
        let value = self.eval(&scripts::slot_texts(&self.markers)).await?;
        let texts: Vec<String> = value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let times: Vec<String> = if texts.is_empty() {
            // Structured walk came up empty; fall back to a raw scan of the
            // container text.
            text::scan_times(&self.slots_text().await?)
        } else {
            text::dedup_keep_order(texts.iter().filter_map(|t| text::first_time(t)))
        };
        Ok(times)
    }

    async fn click_slot(&self, time: &str) -> Result<bool, EngineError> {
        match self
            .resolve(&scripts::find_slot_control(&self.markers, time))
            .await?
        {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.robust_click(id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn expand_comment_box(&self) -> Result<(), EngineError> {
        // Best-effort: a missing toggle just means the field is already
        // visible. Staleness still propagates.
        match self
            .click_by_text(&self.markers.comment_toggle_texts, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_driver_fault() => Err(e),
            Err(e) => {
                debug!("comment toggle click failed: {}", e);
                Ok(())
            }
        }
    }

    async fn fill_comment(&self, comment: &str) -> Result<bool, EngineError> {
        match self
            .resolve(&scripts::find_comment_field(&self.markers))
            .await?
        {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.fill_field(id, comment).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn comment_contains(&self, comment: &str) -> Result<bool, EngineError> {
        match self
            .resolve(&scripts::find_comment_field(&self.markers))
            .await?
        {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                Ok(self.read_field(id).await?.contains(comment))
            }
            None => Ok(false),
        }
    }

    async fn click_submit(&self) -> Result<bool, EngineError> {
        self.click_by_text(&self.markers.submit_texts, None).await
    }

    async fn is_logged_in(&self) -> Result<bool, EngineError> {
        let page = self.page_text().await?;
        Ok(text::contains_any(&page, &self.markers.logged_in_markers))
    }

    async fn auth_required(&self) -> Result<bool, EngineError> {
        let page = self.page_text().await?;
        Ok(text::contains_any(&page, &self.markers.auth_required_markers))
    }

    async fn open_login_modal(&self) -> Result<bool, EngineError> {
        self.click_by_text(&self.markers.login_button_texts, None)
            .await
    }

    async fn open_register_modal(&self) -> Result<bool, EngineError> {
        self.click_by_text(&self.markers.register_button_texts, None)
            .await
    }

    async fn modal_visible(&self) -> Result<bool, EngineError> {
        self.eval_bool(&scripts::element_visible(&self.markers.modal_selector))
            .await
    }

    async fn fill_login_fields(&self, phone: &str, password: &str) -> Result<bool, EngineError> {
        let phone_ok = self
            .fill_modal_input(&self.markers.phone_hints, None, 0, phone)
            .await?;
        let password_ok = self
            .fill_modal_input(&self.markers.password_hints, Some("password"), 0, password)
            .await?;
        Ok(phone_ok && password_ok)
    }

    async fn fill_register_fields(
        &self,
        name: &str,
        phone: &str,
        password: &str,
        confirm: &str,
    ) -> Result<bool, EngineError> {
        let name_ok = self
            .fill_modal_input(&self.markers.name_hints, None, 0, name)
            .await?;
        let phone_ok = self
            .fill_modal_input(&self.markers.phone_hints, None, 0, phone)
            .await?;
        let password_ok = self
            .fill_modal_input(&self.markers.password_hints, Some("password"), 0, password)
            .await?;
        let confirm_ok = self
            .fill_modal_input(&self.markers.confirm_hints, Some("password"), 1, confirm)
            .await?;
        Ok(name_ok && phone_ok && password_ok && confirm_ok)
    }

    async fn submit_login(&self) -> Result<bool, EngineError> {
        let script = scripts::find_modal_submit(&self.markers, &self.markers.login_submit_texts);
        match self.resolve(&script).await? {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.robust_click(id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn submit_register(&self) -> Result<bool, EngineError> {
        let script =
            scripts::find_modal_submit(&self.markers, &self.markers.register_submit_texts);
        match self.resolve(&script).await? {
            Some(obj) => {
                let id = obj.object_id.as_deref().unwrap_or_default();
                self.robust_click(id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn modal_error(&self) -> Result<Option<String>, EngineError> {
        let raw = self
            .eval_string(&scripts::inline_error_text(&self.markers))
            .await?;
        let cleaned = text::clean_spaces(&raw);
        Ok((!cleaned.is_empty()).then(|| text::truncate_chars(&cleaned, 200)))
    }

    async fn record_blocks(&self) -> Result<Vec<String>, EngineError> {
        let value = self
            .eval(&scripts::record_block_texts(&self.markers))
            .await?;
        let raw: Vec<String> = value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for block in raw {
            let denoised = text::denoise_record(&block, &self.markers, RECORD_MAX_LINES);
            if denoised.is_empty() || !text::has_date_or_time(&denoised) {
                continue;
            }
            let key = text::truncate_chars(&text::clean_spaces(&denoised), RECORD_DEDUP_KEY);
            if !seen.insert(key) {
                continue;
            }
            out.push(denoised);
            if out.len() >= RECORD_MAX_ITEMS {
                break;
            }
        }
        Ok(out)
    }
}
