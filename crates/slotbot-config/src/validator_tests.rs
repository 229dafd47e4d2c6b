use super::*;
use slotbot_protocols::Room;

fn config_with_rooms(rooms: Vec<Room>) -> Config {
    Config {
        rooms,
        ..Config::default()
    }
}

#[test]
fn empty_rooms_is_invalid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "rooms"));
}

#[test]
fn valid_rooms_pass() {
    let config = config_with_rooms(vec![Room {
        key: "grey".into(),
        title: "Grey".into(),
        url: "https://example.net/grey".into(),
    }]);
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn bad_room_url_is_flagged() {
    let config = config_with_rooms(vec![Room {
        key: "grey".into(),
        title: "Grey".into(),
        url: "not a url".into(),
    }]);
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "rooms[0].url"));
}

#[test]
fn duplicate_keys_are_flagged() {
    let room = Room {
        key: "grey".into(),
        title: "Grey".into(),
        url: "https://example.net/grey".into(),
    };
    let config = config_with_rooms(vec![room.clone(), room]);
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.message.contains("unique")));
}

#[test]
fn zero_ttl_is_flagged() {
    let mut config = config_with_rooms(vec![Room {
        key: "grey".into(),
        title: "Grey".into(),
        url: "https://example.net/grey".into(),
    }]);
    config.cache.services_ttl_secs = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "cache.services_ttl_secs"));
}
