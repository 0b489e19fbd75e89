use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[]));
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert!(cfg.session_cookie.is_none());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("MAPS_API_BASE_URL", "https://maps.example.test/api/"),
        ("MAPS_SESSION_COOKIE", "SESSION=abc"),
        ("MAPS_REQUEST_TIMEOUT_SECS", "5"),
    ]));
    assert_eq!(cfg.base_url, "https://maps.example.test/api");
    assert_eq!(cfg.session_cookie.as_deref(), Some("SESSION=abc"));
    assert_eq!(cfg.request_timeout_secs, 5);
}

#[test]
fn from_lookup_ignores_bad_timeout_and_blank_cookie() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("MAPS_SESSION_COOKIE", "  "),
        ("MAPS_REQUEST_TIMEOUT_SECS", "soon"),
    ]));
    assert!(cfg.session_cookie.is_none());
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn with_base_url_trims_trailing_slashes() {
    let cfg = ClientConfig::default().with_base_url("http://127.0.0.1:9000//");
    assert_eq!(cfg.base_url, "http://127.0.0.1:9000");
}
