//! Tests for the layered settings store.

use super::*;
use crate::document::DocumentFormat;
use serial_test::serial;

const SETTINGS: &str = r#"
configurations:
  default:
    browser: Chrome
    timeout: 10
    headless: ""
    pageObjectPackages: pages
  qa:
    timeout: 30
    browser: " Fire Fox "
"#;

fn settings() -> SettingsDocument {
    SettingsDocument::parse(SETTINGS, DocumentFormat::Yaml).unwrap()
}

fn store() -> ConfigStore {
    ConfigStore::with_overrides(settings(), Vec::<(String, String)>::new())
}

#[test]
fn settings_document_is_read_for_active_environment() {
    let store = store();
    store.set_environment("qa");

    assert_eq!(store.get("timeout").as_deref(), Some("30"));
    assert_eq!(store.get("pageObjectPackages").as_deref(), Some("pages"));
}

#[test]
fn unknown_environment_uses_default_section() {
    let store = store();
    store.set_environment("prod");

    assert_eq!(store.get("timeout").as_deref(), Some("10"));
}

#[test]
fn overrides_beat_settings_document() {
    let store = ConfigStore::with_overrides(settings(), [("PAGEWRIGHT_TIMEOUT", "45")]);

    assert_eq!(store.get("timeout").as_deref(), Some("45"));
}

#[test]
fn runtime_values_beat_overrides_until_cleared() {
    let store = ConfigStore::with_overrides(settings(), [("PAGEWRIGHT_TIMEOUT", "45")]);

    store.update("timeout", 5);
    assert_eq!(store.get("timeout").as_deref(), Some("5"));

    store.clear("timeout");
    assert_eq!(store.get("timeout").as_deref(), Some("45"));
}

#[test]
fn read_values_are_cached_in_runtime_layer() {
    let store = store();
    store.set_environment("qa");
    store.get("timeout");

    // Changing environment does not change an already-read value.
    store.set_environment("prod");
    assert_eq!(store.get("timeout").as_deref(), Some("30"));

    store.clear_all();
    store.set_environment("prod");
    assert_eq!(store.get("timeout").as_deref(), Some("10"));
}

#[test]
fn missing_setting_is_none_and_required_setting_errors() {
    let store = store();

    assert_eq!(store.get("nothing"), None);

    let err = store.require("nothing").unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::RequiredSettingMissing {
            key: "nothing".to_string(),
            override_variable: "PAGEWRIGHT_NOTHING".to_string(),
        }
    );
}

#[test]
fn get_or_stores_the_default() {
    let store = store();

    assert_eq!(store.get_or("region", "us-east"), "us-east");
    assert_eq!(store.get("region").as_deref(), Some("us-east"));
    assert_eq!(store.get_or("timeout", "99"), "10");
}

#[test]
fn boolean_settings() {
    let store = store();
    store.update("flag_true", "TRUE");
    store.update("flag_other", "yes");

    assert!(store.get_bool("headless"));
    assert!(store.get_bool("flag_true"));
    assert!(!store.get_bool("flag_other"));
    assert!(!store.get_bool("absent"));
}

#[test]
fn numeric_settings() {
    let store = store();
    store.update("ratio", "0.5");
    store.update("bad", "ten");

    assert_eq!(store.get_u64("timeout").unwrap(), Some(10));
    assert_eq!(store.get_f64("ratio").unwrap(), Some(0.5));
    assert_eq!(store.get_u64("absent").unwrap(), None);

    let err = store.get_u64("bad").unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == "bad"));
}

#[test]
fn prefix_queries_cover_runtime_keys() {
    let store = store();
    store.update("api.user", "a");
    store.update("api.token", "b");
    store.update("API.other", "c");

    let keys: Vec<String> = store.keys_with_prefix("api.").into_iter().collect();
    assert_eq!(keys, vec!["api.token".to_string(), "api.user".to_string()]);
    assert_eq!(store.count_with_prefix("api"), 2);
}

#[test]
fn test_values_use_normalized_keys() {
    let store = store();

    store.set_value("Order Number", "12345");

    assert_eq!(store.value("order_number").as_deref(), Some("12345"));
    assert_eq!(store.value("ORDER   NUMBER").as_deref(), Some("12345"));
    assert_eq!(store.value("other"), None);
}

#[test]
fn environment_defaults_to_localhost() {
    let store = store();

    assert_eq!(store.environment(), "localhost");
}

#[test]
fn environment_is_never_read_from_settings_document() {
    let settings = SettingsDocument::parse(
        "configurations:\n  default:\n    env: qa\n",
        DocumentFormat::Yaml,
    )
    .unwrap();
    let store = ConfigStore::with_overrides(settings, Vec::<(String, String)>::new());

    assert_eq!(store.environment(), "localhost");
}

#[test]
fn environment_override() {
    let store = ConfigStore::with_overrides(settings(), [("PAGEWRIGHT_ENV", "stage")]);

    assert_eq!(store.environment(), "stage");
    store.set_environment("qa");
    assert_eq!(store.environment(), "qa");
}

#[test]
fn browser_is_normalized() {
    let store = store();
    assert_eq!(store.browser(), "chrome");

    store.clear_all();
    store.set_environment("qa");
    assert_eq!(store.browser(), "firefox");

    store.update("browser", "IE");
    assert_eq!(store.browser(), "internetexplorer");
}

#[test]
fn browser_defaults_to_chrome() {
    let store = ConfigStore::default();

    assert_eq!(store.browser(), "chrome");
}

#[test]
fn operating_system_setting_or_detection() {
    let store = ConfigStore::default();
    store.update("os", "Windows 11");
    assert_eq!(store.operating_system(), "Windows 11");

    assert_eq!(detect_operating_system("linux"), "linux");
    assert_eq!(detect_operating_system("macos"), "mac");
    assert_eq!(detect_operating_system("Windows"), "windows");
    assert_eq!(detect_operating_system("freebsd"), "freebsd");
}

#[test]
fn override_variable_names() {
    assert_eq!(override_variable("env"), "PAGEWRIGHT_ENV");
    assert_eq!(override_variable("loopInterval"), "PAGEWRIGHT_LOOP_INTERVAL");
    assert_eq!(override_variable("page-timeout"), "PAGEWRIGHT_PAGE_TIMEOUT");
}

#[test]
#[serial]
fn new_captures_process_overrides() {
    std::env::set_var("PAGEWRIGHT_BROWSER", "Edge");
    let store = ConfigStore::new(settings());
    std::env::remove_var("PAGEWRIGHT_BROWSER");

    assert_eq!(store.browser(), "edge");
}
