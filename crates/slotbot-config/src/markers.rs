//! Site marker catalog: the remote site's markup contract as data.
//!
//! The engine never hard-codes a selector, attribute name, URL candidate
//! or visible-text pattern; it reads them from here. Defaults match the
//! currently deployed markup of the target booking site. Matching against
//! phrase lists is always lower-cased containment.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMarkers {
    /// Base site URL, used by login/registration when no room is involved.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    // -- service catalog -----------------------------------------------------
    #[serde(default = "default_service_input_selector")]
    pub service_input_selector: String,

    #[serde(default = "default_service_id_attr")]
    pub service_id_attr: String,

    /// Container of one catalog row; matched by `closest` from the input.
    #[serde(default = "default_service_item_selector")]
    pub service_item_selector: String,

    /// Loose class-substring fallback when the exact container class drifts.
    #[serde(default = "default_service_item_class_hint")]
    pub service_item_class_hint: String,

    #[serde(default = "default_service_name_selector")]
    pub service_name_selector: String,

    #[serde(default = "default_service_duration_selector")]
    pub service_duration_selector: String,

    #[serde(default = "default_service_cost_selector")]
    pub service_cost_selector: String,

    /// Suffix appended to a non-empty cost value in tidied titles.
    #[serde(default = "default_currency_suffix")]
    pub currency_suffix: String,

    /// Currency tokens stripped from raw cost values and used to recognize
    /// price-bearing text in records.
    #[serde(default = "default_currency_tokens")]
    pub currency_tokens: Vec<String>,

    /// Boilerplate phrases stripped from the raw-text catalog fallback.
    #[serde(default = "default_catalog_boilerplate")]
    pub catalog_boilerplate: Vec<String>,

    // -- time slots ----------------------------------------------------------
    #[serde(default = "default_slots_container")]
    pub slots_container: String,

    /// Class token that qualifies a bare label as a slot control.
    #[serde(default = "default_slot_label_class_hint")]
    pub slot_label_class_hint: String,

    #[serde(default = "default_server_error_phrases")]
    pub server_error_phrases: Vec<String>,

    // -- choose-time affordance ----------------------------------------------
    #[serde(default = "default_choose_time_texts")]
    pub choose_time_texts: Vec<String>,

    #[serde(default = "default_choose_time_fallback_selector")]
    pub choose_time_fallback_selector: String,

    // -- calendar ------------------------------------------------------------
    #[serde(default = "default_calendar_root")]
    pub calendar_root: String,

    #[serde(default = "default_day_cell_selector")]
    pub day_cell_selector: String,

    /// Attribute carrying the cell's millisecond UTC timestamp.
    #[serde(default = "default_day_cell_date_attr")]
    pub day_cell_date_attr: String,

    /// Class tokens marking a cell as adjacent-month or unbookable.
    #[serde(default = "default_skip_day_classes")]
    pub skip_day_classes: Vec<String>,

    #[serde(default = "default_nav_next_class")]
    pub nav_next_class: String,

    #[serde(default = "default_nav_prev_class")]
    pub nav_prev_class: String,

    // -- booking -------------------------------------------------------------
    /// Prioritized selector strategies for the comment input.
    #[serde(default = "default_comment_selectors")]
    pub comment_selectors: Vec<String>,

    /// Placeholder/name substrings that identify a comment field.
    #[serde(default = "default_comment_hints")]
    pub comment_hints: Vec<String>,

    /// Texts on affordances that expand a collapsed comment box.
    #[serde(default = "default_comment_toggle_texts")]
    pub comment_toggle_texts: Vec<String>,

    #[serde(default = "default_submit_texts")]
    pub submit_texts: Vec<String>,

    #[serde(default = "default_booking_success_fragments")]
    pub booking_success_fragments: Vec<String>,

    #[serde(default = "default_booking_failure_fragments")]
    pub booking_failure_fragments: Vec<String>,

    // -- auth ----------------------------------------------------------------
    #[serde(default = "default_login_button_texts")]
    pub login_button_texts: Vec<String>,

    #[serde(default = "default_register_button_texts")]
    pub register_button_texts: Vec<String>,

    /// Phrases whose presence means the page believes we are logged in.
    #[serde(default = "default_logged_in_markers")]
    pub logged_in_markers: Vec<String>,

    /// Phrases marking a protected page as auth-required.
    #[serde(default = "default_auth_required_markers")]
    pub auth_required_markers: Vec<String>,

    #[serde(default = "default_modal_selector")]
    pub modal_selector: String,

    #[serde(default = "default_inline_error_selector")]
    pub inline_error_selector: String,

    #[serde(default = "default_phone_hints")]
    pub phone_hints: Vec<String>,

    #[serde(default = "default_password_hints")]
    pub password_hints: Vec<String>,

    #[serde(default = "default_name_hints")]
    pub name_hints: Vec<String>,

    #[serde(default = "default_confirm_hints")]
    pub confirm_hints: Vec<String>,

    #[serde(default = "default_login_submit_texts")]
    pub login_submit_texts: Vec<String>,

    #[serde(default = "default_register_submit_texts")]
    pub register_submit_texts: Vec<String>,

    // -- my records ----------------------------------------------------------
    /// Locale-variant candidates for the protected records page, probed in
    /// order; the first one not showing an auth-required marker wins.
    #[serde(default = "default_records_urls")]
    pub records_urls: Vec<String>,

    #[serde(default = "default_record_status_keywords")]
    pub record_status_keywords: Vec<String>,

    /// Boilerplate lines dropped from extracted record blocks.
    #[serde(default = "default_records_boilerplate")]
    pub records_boilerplate: Vec<String>,
}

impl Default for SiteMarkers {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            service_input_selector: default_service_input_selector(),
            service_id_attr: default_service_id_attr(),
            service_item_selector: default_service_item_selector(),
            service_item_class_hint: default_service_item_class_hint(),
            service_name_selector: default_service_name_selector(),
            service_duration_selector: default_service_duration_selector(),
            service_cost_selector: default_service_cost_selector(),
            currency_suffix: default_currency_suffix(),
            currency_tokens: default_currency_tokens(),
            catalog_boilerplate: default_catalog_boilerplate(),
            slots_container: default_slots_container(),
            slot_label_class_hint: default_slot_label_class_hint(),
            server_error_phrases: default_server_error_phrases(),
            choose_time_texts: default_choose_time_texts(),
            choose_time_fallback_selector: default_choose_time_fallback_selector(),
            calendar_root: default_calendar_root(),
            day_cell_selector: default_day_cell_selector(),
            day_cell_date_attr: default_day_cell_date_attr(),
            skip_day_classes: default_skip_day_classes(),
            nav_next_class: default_nav_next_class(),
            nav_prev_class: default_nav_prev_class(),
            comment_selectors: default_comment_selectors(),
            comment_hints: default_comment_hints(),
            comment_toggle_texts: default_comment_toggle_texts(),
            submit_texts: default_submit_texts(),
            booking_success_fragments: default_booking_success_fragments(),
            booking_failure_fragments: default_booking_failure_fragments(),
            login_button_texts: default_login_button_texts(),
            register_button_texts: default_register_button_texts(),
            logged_in_markers: default_logged_in_markers(),
            auth_required_markers: default_auth_required_markers(),
            modal_selector: default_modal_selector(),
            inline_error_selector: default_inline_error_selector(),
            phone_hints: default_phone_hints(),
            password_hints: default_password_hints(),
            name_hints: default_name_hints(),
            confirm_hints: default_confirm_hints(),
            login_submit_texts: default_login_submit_texts(),
            register_submit_texts: default_register_submit_texts(),
            records_urls: default_records_urls(),
            record_status_keywords: default_record_status_keywords(),
            records_boilerplate: default_records_boilerplate(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_site_url() -> String {
    "https://bumpix.net".into()
}

fn default_service_input_selector() -> String {
    "input.data_service[data-service-id]".into()
}

fn default_service_id_attr() -> String {
    "data-service-id".into()
}

fn default_service_item_selector() -> String {
    "div.master_service_item".into()
}

fn default_service_item_class_hint() -> String {
    "master_service_item".into()
}

fn default_service_name_selector() -> String {
    ".msn_body".into()
}

fn default_service_duration_selector() -> String {
    ".sduration".into()
}

fn default_service_cost_selector() -> String {
    ".scost".into()
}

fn default_currency_suffix() -> String {
    "руб.".into()
}

fn default_currency_tokens() -> Vec<String> {
    strings(&["руб.", "руб", "₽"])
}

fn default_catalog_boilerplate() -> Vec<String> {
    strings(&["Выбрать время", "Выбрано услуг", "Услуги не выбраны"])
}

fn default_slots_container() -> String {
    "#timeBlocks".into()
}

fn default_slot_label_class_hint() -> String {
    "btn-time".into()
}

fn default_server_error_phrases() -> Vec<String> {
    strings(&["servererror", "произошла ошибка", "попробуйте позже"])
}

fn default_choose_time_texts() -> Vec<String> {
    strings(&["Выбрать время"])
}

fn default_choose_time_fallback_selector() -> String {
    "button.btn-orange, button.btn.btn-orange".into()
}

fn default_calendar_root() -> String {
    "div.picker_calendar".into()
}

fn default_day_cell_selector() -> String {
    "td.day".into()
}

fn default_day_cell_date_attr() -> String {
    "data-date".into()
}

fn default_skip_day_classes() -> Vec<String> {
    strings(&["old", "new", "disabled"])
}

fn default_nav_next_class() -> String {
    "next".into()
}

fn default_nav_prev_class() -> String {
    "prev".into()
}

fn default_comment_selectors() -> Vec<String> {
    strings(&[
        "textarea[name*='comment']",
        "textarea[placeholder]",
        "textarea",
        "input[type='text'][name*='comment']",
        "input[type='text'][placeholder]",
        "[contenteditable='true']",
    ])
}

fn default_comment_hints() -> Vec<String> {
    strings(&["коммент", "пожелан", "comment", "примечани"])
}

fn default_comment_toggle_texts() -> Vec<String> {
    strings(&["Комментарий", "Добавить комментарий"])
}

fn default_submit_texts() -> Vec<String> {
    strings(&["Записаться", "Подтвердить", "Оформить запись"])
}

fn default_booking_success_fragments() -> Vec<String> {
    strings(&["вы записаны", "запись создана", "запись успешно", "успешно создана"])
}

fn default_booking_failure_fragments() -> Vec<String> {
    strings(&[
        "не удалось",
        "уже занято",
        "время занято",
        "произошла ошибка",
        "ошибка при создании",
    ])
}

fn default_login_button_texts() -> Vec<String> {
    strings(&["Войти", "Вход"])
}

fn default_register_button_texts() -> Vec<String> {
    strings(&["Регистрация", "Зарегистрироваться"])
}

fn default_logged_in_markers() -> Vec<String> {
    strings(&["выйти", "мои записи", "личный кабинет"])
}

fn default_auth_required_markers() -> Vec<String> {
    strings(&["вход или регистрация", "войдите", "авторизуйтесь"])
}

fn default_modal_selector() -> String {
    ".modal, [role='dialog']".into()
}

fn default_inline_error_selector() -> String {
    ".error, .alert-danger, .invalid-feedback, .help-block".into()
}

fn default_phone_hints() -> Vec<String> {
    strings(&["телефон", "phone"])
}

fn default_password_hints() -> Vec<String> {
    strings(&["пароль", "password"])
}

fn default_name_hints() -> Vec<String> {
    strings(&["имя", "name"])
}

fn default_confirm_hints() -> Vec<String> {
    strings(&["повтор", "ещё раз", "подтверждение", "confirm"])
}

fn default_login_submit_texts() -> Vec<String> {
    strings(&["Войти"])
}

fn default_register_submit_texts() -> Vec<String> {
    strings(&["Зарегистрироваться", "Регистрация"])
}

fn default_records_urls() -> Vec<String> {
    strings(&[
        "https://bumpix.net/user/records",
        "https://bumpix.net/ru/user/records",
        "https://bumpix.net/en/user/records",
    ])
}

fn default_record_status_keywords() -> Vec<String> {
    strings(&["подтвержд", "ожида", "отмен", "выполнен", "записан"])
}

fn default_records_boilerplate() -> Vec<String> {
    strings(&["Показать ещё", "Загрузка", "Фильтр"])
}
