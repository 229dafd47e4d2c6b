use super::*;

fn markers() -> SiteMarkers {
    SiteMarkers::default()
}

#[test]
fn clean_spaces_collapses_nbsp_variants() {
    assert_eq!(clean_spaces("  Массаж\u{00a0} спины \u{202f} 60  мин "), "Массаж спины 60 мин");
    assert_eq!(clean_spaces(""), "");
}

#[test]
fn tidy_title_joins_nonempty_parts() {
    let m = markers();
    assert_eq!(
        tidy_service_title("Массаж", "60 мин", "2000", &m),
        "Массаж — 60 мин — 2000 руб."
    );
    assert_eq!(tidy_service_title("Массаж", "", "", &m), "Массаж");
    assert_eq!(tidy_service_title("", "", "", &m), "");
}

#[test]
fn tidy_title_never_emits_dangling_separators() {
    let m = markers();
    let title = tidy_service_title("", "60 мин", "1500", &m);
    assert!(!title.starts_with('—') && !title.starts_with(' '));
    assert_eq!(title, "60 мин — 1500 руб.");
}

#[test]
fn currency_suffix_iff_cost_present() {
    let m = markers();
    // currency token stripped, canonical suffix appended once
    assert_eq!(tidy_service_title("X", "", "2000 руб.", &m), "X — 2000 руб.");
    assert_eq!(tidy_service_title("X", "", "2000 ₽", &m), "X — 2000 руб.");
    // cost that is only a currency token yields no cost part at all
    assert_eq!(tidy_service_title("X", "", "руб.", &m), "X");
    // no cost, no suffix
    assert!(!tidy_service_title("X", "30 мин", "", &m).contains("руб"));
}

#[test]
fn raw_fallback_strips_boilerplate_and_truncates() {
    let m = markers();
    let raw = "Аренда зала  подробное описание Выбрать время Выбрано услуг: 0";
    let short = short_raw_fallback(raw, &m);
    assert_eq!(short, "Аренда зала подробное описание");

    let long = "x".repeat(300);
    assert_eq!(short_raw_fallback(&long, &m).chars().count(), 140);

    assert_eq!(short_raw_fallback("   ", &m), "");
}

#[test]
fn time_extraction_matches_h_mm_and_hh_mm() {
    assert_eq!(first_time("Свободно в 9:30 и 14:00"), Some("9:30".into()));
    assert_eq!(first_time("no times here"), None);
    assert_eq!(
        scan_times("9:30 14:00 9:30 22:15"),
        vec!["9:30", "14:00", "22:15"]
    );
}

#[test]
fn dedup_preserves_first_seen_order() {
    let items = vec!["14:00".to_string(), "15:00".into(), "14:00".into()];
    assert_eq!(dedup_keep_order(items), vec!["14:00", "15:00"]);
}

#[test]
fn server_error_detection_is_case_insensitive() {
    let m = markers();
    assert!(is_server_error("ServerError: oops", &m));
    assert!(is_server_error(
        "При запросе к серверу произошла ошибка. Попробуйте позже",
        &m
    ));
    assert!(!is_server_error("14:00 15:00", &m));
}

#[test]
fn placeholder_is_blank_or_dots() {
    assert!(is_placeholder(""));
    assert!(is_placeholder("   "));
    assert!(is_placeholder("..."));
    assert!(is_placeholder(" . . . "));
    assert!(!is_placeholder("14:00"));
    assert!(!is_placeholder("....x"));
}

#[test]
fn record_helpers() {
    assert!(has_date_or_time("Запись 12.08.2026 в 14:00"));
    assert!(has_date_or_time("сегодня в 9:30"));
    assert!(!has_date_or_time("без даты"));

    let m = markers();
    let block = "Серая комната\n\nЗагрузка\n12.08 14:00\n2000 руб.\nподтверждено\nлишняя\nстрока";
    let clean = denoise_record(block, &m, 4);
    assert_eq!(clean, "Серая комната\n12.08 14:00\n2000 руб.\nподтверждено");
}

#[test]
fn truncate_respects_char_boundaries() {
    assert_eq!(truncate_chars("мир", 2), "ми");
    assert_eq!(truncate_chars("ab", 10), "ab");
}
