//! Scripted fake of the remote booking page, shared by the algorithm and
//! flow tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use slotbot_protocols::EngineError;

use crate::site::{CalendarCell, CalendarPaging, ServiceRow, SitePage};

/// Mutable scripted state behind the fake.
#[derive(Default)]
pub struct FakeState {
    // navigation
    pub opened_urls: Vec<String>,
    pub current_url: String,
    pub reloads: usize,
    /// Every driver call fails with a driver fault while set (dead session).
    pub driver_dead: bool,

    // page text
    pub page_texts: HashMap<String, String>,
    pub default_page_text: String,

    // services
    pub service_rows: Vec<ServiceRow>,
    pub selected: Vec<String>,
    pub clear_calls: usize,
    /// sid -> remaining activation attempts that fail stale.
    pub stale_activations: HashMap<String, usize>,
    /// When set, the UI never confirms a selection (verification starves).
    pub selection_never_confirms: bool,

    // choose time / calendar
    pub choose_time_available: bool,
    pub calendar_open: bool,
    /// Month pages; paging moves an index over them.
    pub months: Vec<Vec<CalendarCell>>,
    pub month_index: usize,
    pub page_events: usize,
    /// Remaining cell clicks that fail stale.
    pub stale_cell_clicks: usize,
    pub clicked_days: Vec<i64>,

    // slots
    pub slots_text_value: String,
    pub slots_fragment_value: String,
    /// Successive extraction results; the last entry repeats forever.
    pub slot_samples: VecDeque<Vec<String>>,

    // booking
    pub clickable_slots: HashSet<String>,
    pub last_slot_clicked: Option<String>,
    /// Slots whose confirmation form has no comment field.
    pub comment_missing_for: HashSet<String>,
    pub comment_value: String,
    pub submit_present: bool,
    pub submitted: bool,
    /// time -> page text shown after submitting that slot.
    pub outcome_texts: HashMap<String, String>,

    // auth
    pub logged_in: bool,
    pub auth_required_urls: HashSet<String>,
    pub login_button: bool,
    pub register_button: bool,
    pub modal_open: bool,
    pub fields_present: bool,
    /// Submitting closes the modal when set.
    pub submit_closes_modal: bool,
    pub inline_error: Option<String>,
    pub filled_fields: Vec<(String, String)>,

    // records
    pub records_by_url: HashMap<String, Vec<String>>,
}

/// Scripted [`SitePage`] implementation.
#[derive(Default)]
pub struct FakeSite {
    pub state: Mutex<FakeState>,
}

impl FakeSite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock())
    }

    fn check_driver(&self) -> Result<(), EngineError> {
        if self.state.lock().driver_dead {
            Err(EngineError::driver("fake session is dead"))
        } else {
            Ok(())
        }
    }
}

/// Build one month page of selectable cells.
pub fn month_page(year: i32, month: u32, days: impl IntoIterator<Item = u32>) -> Vec<CalendarCell> {
    days.into_iter()
        .map(|day| cell(year, month, day, true))
        .collect()
}

pub fn cell(year: i32, month: u32, day: u32, selectable: bool) -> CalendarCell {
    let ms = Utc
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid test date")
        .timestamp_millis();
    CalendarCell {
        ms,
        year,
        month,
        day,
        selectable,
    }
}

/// The month page containing `date`; always includes `date`'s own day.
pub fn month_of(date: NaiveDate) -> Vec<CalendarCell> {
    let mut days: Vec<u32> = (1..=28).collect();
    if date.day() > 28 {
        days.push(date.day());
    }
    month_page(date.year(), date.month(), days)
}

pub fn service_row(id: &str, name: &str, duration: &str, cost: &str) -> ServiceRow {
    ServiceRow {
        id: id.to_string(),
        name: name.to_string(),
        duration: duration.to_string(),
        cost: cost.to_string(),
        raw: format!("{name} {duration} {cost}"),
    }
}

#[async_trait]
impl SitePage for FakeSite {
    async fn open(&self, url: &str) -> Result<(), EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        s.opened_urls.push(url.to_string());
        s.current_url = url.to_string();
        Ok(())
    }

    async fn reload(&self) -> Result<(), EngineError> {
        self.check_driver()?;
        self.state.lock().reloads += 1;
        Ok(())
    }

    async fn page_text(&self) -> Result<String, EngineError> {
        self.check_driver()?;
        let s = self.state.lock();
        if s.submitted {
            if let Some(time) = &s.last_slot_clicked {
                if let Some(text) = s.outcome_texts.get(time) {
                    return Ok(text.clone());
                }
            }
        }
        Ok(s.page_texts
            .get(&s.current_url)
            .cloned()
            .unwrap_or_else(|| s.default_page_text.clone()))
    }

    async fn service_count(&self) -> Result<usize, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().service_rows.len())
    }

    async fn service_rows(&self) -> Result<Vec<ServiceRow>, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().service_rows.clone())
    }

    async fn clear_service_selection(&self) -> Result<(), EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        s.selected.clear();
        s.clear_calls += 1;
        Ok(())
    }

    async fn activate_service(&self, service_id: &str) -> Result<(), EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if let Some(remaining) = s.stale_activations.get_mut(service_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::stale(format!("service control {service_id}")));
            }
        }
        if !s.service_rows.iter().any(|r| r.id == service_id) {
            return Err(EngineError::stale(format!("service control {service_id}")));
        }
        if !s.selected.iter().any(|sid| sid == service_id) {
            s.selected.push(service_id.to_string());
        }
        Ok(())
    }

    async fn services_selected(&self, service_ids: &[String]) -> Result<bool, EngineError> {
        self.check_driver()?;
        let s = self.state.lock();
        if s.selection_never_confirms {
            return Ok(false);
        }
        Ok(service_ids.iter().all(|sid| s.selected.contains(sid)))
    }

    async fn click_choose_time(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.choose_time_available {
            return Ok(false);
        }
        s.calendar_open = true;
        Ok(true)
    }

    async fn calendar_visible(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().calendar_open)
    }

    async fn calendar_cells(&self) -> Result<Vec<CalendarCell>, EngineError> {
        self.check_driver()?;
        let s = self.state.lock();
        Ok(s.months.get(s.month_index).cloned().unwrap_or_default())
    }

    async fn click_cell(&self, cell: &CalendarCell) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if s.stale_cell_clicks > 0 {
            s.stale_cell_clicks -= 1;
            return Err(EngineError::stale("day cell"));
        }
        let present = s
            .months
            .get(s.month_index)
            .map(|m| m.iter().any(|c| c.ms == cell.ms && c.selectable))
            .unwrap_or(false);
        if !present {
            return Ok(false);
        }
        s.clicked_days.push(cell.ms);
        s.slots_fragment_value = format!("<day ms={}>", cell.ms);
        Ok(true)
    }

    async fn page_calendar(&self, direction: CalendarPaging) -> Result<(), EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        s.page_events += 1;
        match direction {
            CalendarPaging::Forward => {
                if s.month_index + 1 < s.months.len() {
                    s.month_index += 1;
                }
            }
            CalendarPaging::Back => {
                s.month_index = s.month_index.saturating_sub(1);
            }
        }
        Ok(())
    }

    async fn slots_fragment(&self) -> Result<String, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().slots_fragment_value.clone())
    }

    async fn slots_text(&self) -> Result<String, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().slots_text_value.clone())
    }

    async fn extract_times(&self) -> Result<Vec<String>, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        Ok(match s.slot_samples.len() {
            0 => Vec::new(),
            1 => s.slot_samples.front().cloned().unwrap_or_default(),
            _ => s.slot_samples.pop_front().unwrap_or_default(),
        })
    }

    async fn click_slot(&self, time: &str) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.clickable_slots.contains(time) {
            return Ok(false);
        }
        s.last_slot_clicked = Some(time.to_string());
        s.submitted = false;
        Ok(true)
    }

    async fn expand_comment_box(&self) -> Result<(), EngineError> {
        self.check_driver()
    }

    async fn fill_comment(&self, text: &str) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        let missing = s
            .last_slot_clicked
            .as_ref()
            .map(|t| s.comment_missing_for.contains(t))
            .unwrap_or(false);
        if missing {
            return Ok(false);
        }
        s.comment_value = text.to_string();
        Ok(true)
    }

    async fn comment_contains(&self, text: &str) -> Result<bool, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().comment_value.contains(text))
    }

    async fn click_submit(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.submit_present {
            return Ok(false);
        }
        s.submitted = true;
        Ok(true)
    }

    async fn is_logged_in(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().logged_in)
    }

    async fn auth_required(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let s = self.state.lock();
        Ok(s.auth_required_urls.contains(&s.current_url))
    }

    async fn open_login_modal(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.login_button {
            return Ok(false);
        }
        s.modal_open = true;
        Ok(true)
    }

    async fn open_register_modal(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.register_button {
            return Ok(false);
        }
        s.modal_open = true;
        Ok(true)
    }

    async fn modal_visible(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().modal_open)
    }

    async fn fill_login_fields(&self, phone: &str, password: &str) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.fields_present {
            return Ok(false);
        }
        s.filled_fields.push(("phone".into(), phone.to_string()));
        s.filled_fields
            .push(("password".into(), password.to_string()));
        Ok(true)
    }

    async fn fill_register_fields(
        &self,
        name: &str,
        phone: &str,
        password: &str,
        confirm: &str,
    ) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.fields_present {
            return Ok(false);
        }
        for (key, value) in [
            ("name", name),
            ("phone", phone),
            ("password", password),
            ("confirm", confirm),
        ] {
            s.filled_fields.push((key.into(), value.to_string()));
        }
        Ok(true)
    }

    async fn submit_login(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.fields_present {
            return Ok(false);
        }
        if s.submit_closes_modal {
            s.modal_open = false;
        }
        Ok(true)
    }

    async fn submit_register(&self) -> Result<bool, EngineError> {
        self.check_driver()?;
        let mut s = self.state.lock();
        if !s.fields_present {
            return Ok(false);
        }
        if s.submit_closes_modal {
            s.modal_open = false;
        }
        Ok(true)
    }

    async fn modal_error(&self) -> Result<Option<String>, EngineError> {
        self.check_driver()?;
        Ok(self.state.lock().inline_error.clone())
    }

    async fn record_blocks(&self) -> Result<Vec<String>, EngineError> {
        self.check_driver()?;
        let s = self.state.lock();
        Ok(s.records_by_url
            .get(&s.current_url)
            .cloned()
            .unwrap_or_default())
    }
}
