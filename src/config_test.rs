use super::*;

// =============================================================================
// parse_bool / env_bool: unique env var names avoid races with parallel tests.
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On"] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "FALSE", "No"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_whitespace_trimmed() {
    assert_eq!(parse_bool("  yes  "), Some(true));
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

#[test]
fn env_bool_reads_variable() {
    let key = "__TEST_ADMINBOARD_EB_3381__";
    unsafe { std::env::set_var(key, "on") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_ADMINBOARD_EB_SURELY_UNSET__"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_reads_number() {
    let key = "__TEST_ADMINBOARD_EP_1207__";
    unsafe { std::env::set_var(key, " 8080 ") };
    assert_eq!(env_parse::<u16>(key, 3000), 8080);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_ADMINBOARD_EP_1208__";
    unsafe { std::env::set_var(key, "not-a-number") };
    assert_eq!(env_parse::<u16>(key, 3000), 3000);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse::<i64>("__TEST_ADMINBOARD_EP_UNSET__", -7), -7);
}

// =============================================================================
// defaults
// =============================================================================

#[test]
fn default_config_matches_documented_values() {
    let config = AppConfig::default();
    assert_eq!(config.port, 3000);
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.toast_default_duration_ms, 5000);
    assert_eq!(config.toast_max_clients, 10_000);
    assert!(!config.cookies.secure);
    assert_eq!(config.cookies.access_max_age_secs, 86_400);
    assert_eq!(config.cookies.refresh_max_age_secs, 604_800);
    assert_eq!(config.api_timeouts.request, Duration::from_secs(30));
    assert_eq!(config.api_timeouts.connect, Duration::from_secs(5));
}

#[test]
fn default_api_base_url_has_no_trailing_slash() {
    assert!(!DEFAULT_API_BASE_URL.ends_with('/'));
}
