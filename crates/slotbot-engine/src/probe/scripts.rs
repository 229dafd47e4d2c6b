//! JavaScript snippets executed against the live page.
//!
//! Every selector, attribute and text pattern is substituted from
//! [`SiteMarkers`]; the templates below carry only structure. Substitution
//! goes through JSON encoding, so marker values can never break out of
//! their string literals.

use serde_json::json;
use slotbot_config::SiteMarkers;

/// JSON-encode a value into a JS literal.
fn js<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("marker values are always serializable")
}

/// Render a template, replacing each `@@NAME@@` with its substitution.
fn render(template: &str, subs: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in subs {
        out = out.replace(&format!("@@{}@@", name), value);
    }
    debug_assert!(!out.contains("@@"), "unsubstituted template token");
    out
}

/// Shared helper: disabled-like check (attribute, aria, class token,
/// pointer-events).
const IS_DISABLED_HELPER: &str = r#"
const isDisabledLike = (el) => {
  if (!el) return true;
  const cls = (el.getAttribute('class') || '').toLowerCase();
  const aria = (el.getAttribute('aria-disabled') || '').toLowerCase();
  const disabled = el.getAttribute('disabled');
  const pe = window.getComputedStyle(el).pointerEvents;
  return !!disabled || aria === 'true' || cls.includes('disabled') || pe === 'none';
};
"#;

/// Shared helper: hidden check by computed style.
const IS_HIDDEN_HELPER: &str = r#"
const isHidden = (el) => {
  const st = window.getComputedStyle(el);
  return st.display === 'none' || st.visibility === 'hidden';
};
"#;

pub fn body_present() -> String {
    "!!document.body".to_string()
}

pub fn page_text() -> String {
    "document.body ? (document.body.innerText || '') : ''".to_string()
}

pub fn service_count(m: &SiteMarkers) -> String {
    render(
        "document.querySelectorAll(@@INPUT@@).length",
        &[("INPUT", js(&m.service_input_selector))],
    )
}

pub fn service_rows(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const inputs = Array.from(document.querySelectorAll(@@INPUT@@));
  const out = [];
  for (const input of inputs) {
    const item = input.closest(@@ITEM@@) ||
                 input.closest('[class*=' + JSON.stringify(@@ITEM_HINT@@) + ']');
    const id = (input.getAttribute(@@ID_ATTR@@) || '').trim();
    if (!item || !id) continue;

    const pick = (sel) => { const el = item.querySelector(sel); return el ? (el.textContent || '').trim() : ''; };
    out.push({
      id,
      name: pick(@@NAME@@),
      duration: pick(@@DURATION@@),
      cost: pick(@@COST@@),
      raw: (item.innerText || '').trim(),
    });
  }
  return out;
})()
"#,
        &[
            ("INPUT", js(&m.service_input_selector)),
            ("ITEM", js(&m.service_item_selector)),
            ("ITEM_HINT", js(&m.service_item_class_hint)),
            ("ID_ATTR", js(&m.service_id_attr)),
            ("NAME", js(&m.service_name_selector)),
            ("DURATION", js(&m.service_duration_selector)),
            ("COST", js(&m.service_cost_selector)),
        ],
    )
}

pub fn clear_services(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const inputs = Array.from(document.querySelectorAll(@@INPUT@@));
  for (const inp of inputs) {
    const label = inp.closest('label');
    if (inp.checked) {
      inp.checked = false;
      inp.dispatchEvent(new Event('input', {bubbles: true}));
      inp.dispatchEvent(new Event('change', {bubbles: true}));
    }
    if (label && label.classList.contains('active')) {
      label.classList.remove('active');
    }
  }
})()
"#,
        &[("INPUT", js(&m.service_input_selector))],
    )
}

/// Expression resolving one service control to a handle (or null).
pub fn find_service_input(m: &SiteMarkers, service_id: &str) -> String {
    render(
        r#"document.querySelector(@@INPUT@@ + '[' + @@ID_ATTR@@ + '=' + JSON.stringify(@@SID@@) + ']')"#,
        &[
            ("INPUT", js(&m.service_input_selector)),
            ("ID_ATTR", js(&m.service_id_attr)),
            ("SID", js(&service_id)),
        ],
    )
}

/// Called on a service input: force checked/active state and notify
/// listeners that only react to input/change events.
pub const FORCE_SERVICE_STATE: &str = r#"
function() {
  const label = this.closest('label');
  this.checked = true;
  this.dispatchEvent(new Event('input', {bubbles: true}));
  this.dispatchEvent(new Event('change', {bubbles: true}));
  if (label) label.classList.add('active');
}
"#;

pub fn services_selected(m: &SiteMarkers, service_ids: &[String]) -> String {
    render(
        r#"
(() => {
  const sids = @@SIDS@@;
  const selected = (sid) => {
    const inp = document.querySelector(@@INPUT@@ + '[' + @@ID_ATTR@@ + '=' + JSON.stringify(sid) + ']');
    if (!inp) return false;
    const label = inp.closest('label');
    const active = label ? label.classList.contains('active') : false;
    return !!inp.checked || active;
  };
  return sids.every(selected);
})()
"#,
        &[
            ("SIDS", js(&service_ids)),
            ("INPUT", js(&m.service_input_selector)),
            ("ID_ATTR", js(&m.service_id_attr)),
        ],
    )
}

/// Expression resolving an enabled control whose visible text contains one
/// of the given fragments; falls back to a CSS selector when provided.
pub fn find_control_by_text(texts: &[String], fallback_selector: Option<&str>) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  const texts = @@TEXTS@@.map(t => t.toLowerCase());
  const nodes = Array.from(document.querySelectorAll(
    'button, a, input[type="button"], input[type="submit"], [role="button"]'));
  for (const el of nodes) {
    if (isHidden(el) || isDisabledLike(el)) continue;
    const text = ((el.innerText || el.textContent || el.value || '') + '').trim().toLowerCase();
    if (!text) continue;
    if (texts.some(t => text.includes(t))) return el;
  }
  const fallback = @@FALLBACK@@;
  if (fallback) {
    for (const el of document.querySelectorAll(fallback)) {
      if (!isHidden(el) && !isDisabledLike(el)) return el;
    }
  }
  return null;
})()
"#,
        &[
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("TEXTS", js(&texts)),
            ("FALLBACK", js(&fallback_selector)),
        ],
    )
}

pub fn element_visible(selector: &str) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  for (const el of document.querySelectorAll(@@SEL@@)) {
    if (!isHidden(el)) return true;
  }
  return false;
})()
"#,
        &[
            ("HELPERS", IS_HIDDEN_HELPER.to_string()),
            ("SEL", js(&selector)),
        ],
    )
}

pub fn calendar_cells(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const root = document.querySelector(@@ROOT@@) || document;
  const skip = @@SKIP@@;
  const out = [];
  for (const cell of root.querySelectorAll(@@CELL@@)) {
    const ms = cell.getAttribute(@@DATE_ATTR@@);
    if (!ms || isNaN(Number(ms))) continue;
    const cls = (cell.getAttribute('class') || '');
    const selectable = !skip.some(token => cls.includes(token));
    out.push({ms: Number(ms), selectable});
  }
  return out;
})()
"#,
        &[
            ("ROOT", js(&m.calendar_root)),
            ("SKIP", js(&m.skip_day_classes)),
            ("CELL", js(&m.day_cell_selector)),
            ("DATE_ATTR", js(&m.day_cell_date_attr)),
        ],
    )
}

/// Expression re-resolving one day cell by its timestamp.
pub fn find_day_cell(m: &SiteMarkers, ms: i64) -> String {
    render(
        r#"
(() => {
  const root = document.querySelector(@@ROOT@@) || document;
  const skip = @@SKIP@@;
  for (const cell of root.querySelectorAll(@@CELL@@)) {
    if (cell.getAttribute(@@DATE_ATTR@@) !== String(@@MS@@)) continue;
    const cls = (cell.getAttribute('class') || '');
    if (skip.some(token => cls.includes(token))) continue;
    return cell;
  }
  return null;
})()
"#,
        &[
            ("ROOT", js(&m.calendar_root)),
            ("SKIP", js(&m.skip_day_classes)),
            ("CELL", js(&m.day_cell_selector)),
            ("DATE_ATTR", js(&m.day_cell_date_attr)),
            ("MS", ms.to_string()),
        ],
    )
}

/// Expression resolving the month paging control.
pub fn find_calendar_nav(m: &SiteMarkers, forward: bool) -> String {
    let class = if forward {
        &m.nav_next_class
    } else {
        &m.nav_prev_class
    };
    render(
        r#"
(() => {
  const root = document.querySelector(@@ROOT@@) || document;
  return root.querySelector('.datepicker-days th.' + @@DIR@@) ||
         root.querySelector('th.' + @@DIR@@) || null;
})()
"#,
        &[("ROOT", js(&m.calendar_root)), ("DIR", js(&class))],
    )
}

pub fn slots_fragment(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const tb = document.querySelector(@@CONTAINER@@);
  return tb ? (tb.innerHTML || '') : '';
})()
"#,
        &[("CONTAINER", js(&m.slots_container))],
    )
}

pub fn slots_text(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const tb = document.querySelector(@@CONTAINER@@);
  return tb ? (tb.innerText || '') : '';
})()
"#,
        &[("CONTAINER", js(&m.slots_container))],
    )
}

/// Raw texts of visible, enabled slot controls inside the container.
pub fn slot_texts(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  const tb = document.querySelector(@@CONTAINER@@);
  if (!tb) return [];
  @@HELPERS@@
  const out = [];
  for (const el of tb.querySelectorAll('label,button,a')) {
    if (isHidden(el)) continue;

    let ok = true;
    if (el.tagName.toLowerCase() === 'label') {
      const inpInside = el.querySelector('input');
      const htmlFor = (el.getAttribute('for') || '').trim();
      const cls = (el.getAttribute('class') || '').toLowerCase();
      ok = !!inpInside || !!htmlFor || cls.includes(@@LABEL_HINT@@);
      if (inpInside && isDisabledLike(inpInside)) ok = false;
    }
    if (!ok || isDisabledLike(el)) continue;

    const text = (el.textContent || el.innerText || '').trim();
    if (text) out.push(text);
  }
  return out;
})()
"#,
        &[
            ("CONTAINER", js(&m.slots_container)),
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("LABEL_HINT", js(&m.slot_label_class_hint)),
        ],
    )
}

/// Expression resolving the slot control whose extracted time equals the
/// target.
pub fn find_slot_control(m: &SiteMarkers, time: &str) -> String {
    render(
        r#"
(() => {
  const tb = document.querySelector(@@CONTAINER@@);
  if (!tb) return null;
  @@HELPERS@@
  const re = /\b\d{1,2}:\d{2}\b/;
  for (const el of tb.querySelectorAll('label,button,a')) {
    if (isHidden(el) || isDisabledLike(el)) continue;
    const text = (el.textContent || el.innerText || '').trim();
    const match = text.match(re);
    if (match && match[0] === @@TIME@@) return el;
  }
  return null;
})()
"#,
        &[
            ("CONTAINER", js(&m.slots_container)),
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("TIME", js(&time)),
        ],
    )
}

/// Expression resolving the comment field by the prioritized strategies.
pub fn find_comment_field(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  const hints = @@HINTS@@.map(h => h.toLowerCase());
  const selectors = @@SELECTORS@@;
  const hintText = (el) =>
    ((el.getAttribute('placeholder') || '') + ' ' +
     (el.getAttribute('name') || '') + ' ' +
     (el.getAttribute('aria-label') || '')).toLowerCase();

  for (const sel of selectors) {
    const visible = [];
    for (const el of document.querySelectorAll(sel)) {
      if (!isHidden(el) && !isDisabledLike(el)) visible.push(el);
    }
    if (!visible.length) continue;

    // A selector that already names the field is trusted as-is.
    if (sel.toLowerCase().includes('comment')) return visible[0];

    const hinted = visible.find(el => hints.some(h => hintText(el).includes(h)));
    if (hinted) return hinted;

    // Last-resort generic strategies only win when unambiguous.
    if (visible.length === 1 &&
        (sel === 'textarea' || sel.includes('contenteditable'))) {
      return visible[0];
    }
  }
  return null;
})()
"#,
        &[
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("HINTS", js(&m.comment_hints)),
            ("SELECTORS", js(&m.comment_selectors)),
        ],
    )
}

/// Called on a field: write the value the way its element kind expects and
/// notify listeners.
pub const SET_FIELD_VALUE: &str = r#"
function(value) {
  if ('value' in this) {
    this.value = value;
  } else {
    this.textContent = value;
  }
  this.dispatchEvent(new Event('input', {bubbles: true}));
  this.dispatchEvent(new Event('change', {bubbles: true}));
}
"#;

/// Called on a field: read its current value.
pub const READ_FIELD_VALUE: &str = r#"
function() {
  return ('value' in this) ? (this.value || '') : (this.textContent || '');
}
"#;

/// Expression resolving an input inside the visible modal by placeholder/
/// name hints, optionally restricted to a type.
///
/// A hint match wins outright. When a type is requested, hint-less inputs
/// of that type are kept as ordered candidates and `nth` picks among them
/// (password + confirm-password share a type and differ only by position
/// on some locales).
pub fn find_modal_input(
    m: &SiteMarkers,
    hints: &[String],
    input_type: Option<&str>,
    nth: usize,
) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  const hints = @@HINTS@@.map(h => h.toLowerCase());
  const wantType = @@TYPE@@;
  let roots = [];
  for (const modal of document.querySelectorAll(@@MODAL@@)) {
    if (!isHidden(modal)) roots.push(modal);
  }
  if (!roots.length) roots = [document];
  const candidates = [];
  for (const root of roots) {
    for (const el of root.querySelectorAll('input, textarea')) {
      if (isHidden(el) || isDisabledLike(el)) continue;
      const type = (el.getAttribute('type') || 'text').toLowerCase();
      if (wantType && type !== wantType) continue;
      const hintText = ((el.getAttribute('placeholder') || '') + ' ' +
                        (el.getAttribute('name') || '')).toLowerCase();
      if (hints.some(h => hintText.includes(h))) return el;
      if (wantType) candidates.push(el);
    }
  }
  return candidates[@@NTH@@] || null;
})()
"#,
        &[
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("HINTS", js(&hints)),
            ("TYPE", js(&input_type)),
            ("MODAL", js(&m.modal_selector)),
            ("NTH", nth.to_string()),
        ],
    )
}

/// Expression resolving a submit control inside the visible modal by text.
pub fn find_modal_submit(m: &SiteMarkers, texts: &[String]) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  const texts = @@TEXTS@@.map(t => t.toLowerCase());
  let roots = [];
  for (const modal of document.querySelectorAll(@@MODAL@@)) {
    if (!isHidden(modal)) roots.push(modal);
  }
  if (!roots.length) roots = [document];
  for (const root of roots) {
    for (const el of root.querySelectorAll(
        'button, a, input[type="submit"], input[type="button"], [role="button"]')) {
      if (isHidden(el) || isDisabledLike(el)) continue;
      const text = ((el.innerText || el.textContent || el.value || '') + '').trim().toLowerCase();
      if (texts.some(t => text.includes(t))) return el;
    }
  }
  return null;
})()
"#,
        &[
            ("HELPERS", format!("{IS_HIDDEN_HELPER}{IS_DISABLED_HELPER}")),
            ("TEXTS", js(&texts)),
            ("MODAL", js(&m.modal_selector)),
        ],
    )
}

/// Visible inline error text, or empty string.
pub fn inline_error_text(m: &SiteMarkers) -> String {
    render(
        r#"
(() => {
  @@HELPERS@@
  for (const el of document.querySelectorAll(@@SEL@@)) {
    if (isHidden(el)) continue;
    const text = (el.innerText || '').trim();
    if (text) return text;
  }
  return '';
})()
"#,
        &[
            ("HELPERS", IS_HIDDEN_HELPER.to_string()),
            ("SEL", js(&m.inline_error_selector)),
        ],
    )
}

/// Raw texts of visible containers that look like reservation blocks:
/// carry a date-or-time pattern plus a currency or status keyword.
pub fn record_block_texts(m: &SiteMarkers) -> String {
    let keywords: Vec<String> = m
        .record_status_keywords
        .iter()
        .chain(m.currency_tokens.iter())
        .cloned()
        .collect();
    render(
        r#"
(() => {
  @@HELPERS@@
  const keywords = @@KEYWORDS@@.map(k => k.toLowerCase());
  const dateOrTime = /\b\d{1,2}[.\/]\d{1,2}([.\/]\d{2,4})?\b|\b\d{1,2}:\d{2}\b/;
  const out = [];
  for (const el of document.querySelectorAll('div, li, tr, article')) {
    if (isHidden(el)) continue;
    // Leaf-most matching containers only; a wrapper repeating its child's
    // text adds nothing but duplicates.
    const text = (el.innerText || '').trim();
    if (!text || text.length > 600) continue;
    const low = text.toLowerCase();
    if (!dateOrTime.test(text)) continue;
    if (!keywords.some(k => low.includes(k))) continue;
    const nested = el.querySelector('div, li, tr, article');
    if (nested && (nested.innerText || '').trim() === text) continue;
    out.push(text);
    if (out.length >= 40) break;
  }
  return out;
})()
"#,
        &[
            ("HELPERS", IS_HIDDEN_HELPER.to_string()),
            ("KEYWORDS", js(&keywords)),
        ],
    )
}

/// Called on any element: direct click fallback used when the trusted
/// mouse path is unavailable.
pub const SCRIPTED_CLICK: &str = "function() { this.click(); }";

/// Called on any element: bring it into view before a trusted click.
pub const SCROLL_INTO_VIEW: &str = "function() { this.scrollIntoView({block: 'center'}); }";
