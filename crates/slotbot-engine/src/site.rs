//! The seam between flows and the live document.
//!
//! [`SitePage`] is the complete set of logical page operations the engine
//! performs. Production uses [`crate::probe::DomProbe`], which renders
//! each operation as marker-driven JavaScript against a CDP page session;
//! tests drive the same flows against a scripted fake. Read operations
//! return plain structured data, never live handles, so callers can reason
//! about results without re-querying the document.

use async_trait::async_trait;
use slotbot_protocols::EngineError;

/// One raw service catalog row, validated at the probe boundary.
#[derive(Debug, Clone, Default)]
pub struct ServiceRow {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub cost: String,
    /// Full visible text of the row, for the denoised fallback title.
    pub raw: String,
}

/// One decoded calendar day cell.
///
/// The date is decoded from the cell's embedded millisecond timestamp in
/// UTC — never local time — so the same cell resolves to the same date in
/// every timezone. The timestamp doubles as the cell's re-resolution key:
/// clicking goes through a fresh lookup, and a cell that vanished between
/// looks surfaces as staleness to the caller's retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    /// Millisecond UTC timestamp carried by the cell.
    pub ms: i64,
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub day: u32,
    /// False for adjacent-month and disabled cells.
    pub selectable: bool,
}

/// Direction for paging the month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarPaging {
    Forward,
    Back,
}

/// Logical operations over the remote booking page.
#[async_trait]
pub trait SitePage: Send + Sync {
    // -- navigation ----------------------------------------------------------
    async fn open(&self, url: &str) -> Result<(), EngineError>;
    async fn reload(&self) -> Result<(), EngineError>;
    /// Visible text of the whole page.
    async fn page_text(&self) -> Result<String, EngineError>;

    // -- service catalog -----------------------------------------------------
    /// Number of selectable-service controls currently in the document.
    async fn service_count(&self) -> Result<usize, EngineError>;
    async fn service_rows(&self) -> Result<Vec<ServiceRow>, EngineError>;

    // -- service selection ---------------------------------------------------
    /// Uncheck every active service control regardless of prior state.
    async fn clear_service_selection(&self) -> Result<(), EngineError>;
    /// Click and force-activate one service control. Staleness is
    /// re-raised so the caller can re-resolve and retry.
    async fn activate_service(&self, service_id: &str) -> Result<(), EngineError>;
    /// True when every requested id reports selected (checked or active).
    async fn services_selected(&self, service_ids: &[String]) -> Result<bool, EngineError>;

    // -- choose-time affordance ----------------------------------------------
    /// Locate and click the enabled choose-time control; false when it is
    /// currently absent or disabled-like.
    async fn click_choose_time(&self) -> Result<bool, EngineError>;
    async fn calendar_visible(&self) -> Result<bool, EngineError>;

    // -- calendar ------------------------------------------------------------
    /// All rendered day cells, decoded; includes unselectable ones so the
    /// caller can tell "month rendered" from "target absent".
    async fn calendar_cells(&self) -> Result<Vec<CalendarCell>, EngineError>;
    /// Click a previously found cell. `Ok(false)` when the cell is no
    /// longer rendered; `Err(Stale)` when it died mid-click.
    async fn click_cell(&self, cell: &CalendarCell) -> Result<bool, EngineError>;
    async fn page_calendar(&self, direction: CalendarPaging) -> Result<(), EngineError>;

    // -- slot container ------------------------------------------------------
    /// Serialized slot container fragment; empty string when missing.
    async fn slots_fragment(&self) -> Result<String, EngineError>;
    async fn slots_text(&self) -> Result<String, EngineError>;
    /// Visible, enabled slot times in first-seen order, deduplicated.
    async fn extract_times(&self) -> Result<Vec<String>, EngineError>;

    // -- booking -------------------------------------------------------------
    /// Click the slot control carrying the given time; false when absent.
    async fn click_slot(&self, time: &str) -> Result<bool, EngineError>;
    /// Best-effort expansion of a collapsed comment affordance.
    async fn expand_comment_box(&self) -> Result<(), EngineError>;
    /// Locate the comment input by the prioritized strategies, clear and
    /// fill it; false when no field could be found.
    async fn fill_comment(&self, text: &str) -> Result<bool, EngineError>;
    /// Re-read the comment field and check it carries the text.
    async fn comment_contains(&self, text: &str) -> Result<bool, EngineError>;
    /// Click the submission control; false when absent or disabled-like.
    async fn click_submit(&self) -> Result<bool, EngineError>;

    // -- auth ----------------------------------------------------------------
    async fn is_logged_in(&self) -> Result<bool, EngineError>;
    /// True when the current page shows an auth-required marker.
    async fn auth_required(&self) -> Result<bool, EngineError>;
    async fn open_login_modal(&self) -> Result<bool, EngineError>;
    async fn open_register_modal(&self) -> Result<bool, EngineError>;
    async fn modal_visible(&self) -> Result<bool, EngineError>;
    async fn fill_login_fields(&self, phone: &str, password: &str) -> Result<bool, EngineError>;
    async fn fill_register_fields(
        &self,
        name: &str,
        phone: &str,
        password: &str,
        confirm: &str,
    ) -> Result<bool, EngineError>;
    async fn submit_login(&self) -> Result<bool, EngineError>;
    async fn submit_register(&self) -> Result<bool, EngineError>;
    /// Visible inline error banner text, if any.
    async fn modal_error(&self) -> Result<Option<String>, EngineError>;

    // -- my records ----------------------------------------------------------
    /// Extracted reservation summaries from the current (records) page.
    async fn record_blocks(&self) -> Result<Vec<String>, EngineError>;
}
