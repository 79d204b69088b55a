use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use lookup_core::config::{self, ConfigError, LookupConfig};

fn scratch_path(name: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("lookup-config-{unique}"))
        .join(name)
}

#[test]
fn accepts_default_config() {
    let cfg = LookupConfig::default();
    assert_eq!(cfg.limit, 5);
    assert_eq!(cfg.search_delay_ms, 300);
    assert_eq!(cfg.blur_delay_ms, 300);
    assert_eq!(cfg.icon_name, "standard:default");
    assert!(config::validate(&cfg).is_ok());
    assert_eq!(config::load(None).unwrap(), cfg);
}

#[test]
fn rejects_limit_out_of_range() {
    let cfg = LookupConfig {
        limit: 200,
        ..Default::default()
    };
    assert!(matches!(config::validate(&cfg), Err(ConfigError::Invalid(_))));
}

#[test]
fn rejects_blank_field_name_and_long_delays() {
    let blank = LookupConfig {
        field_api_name: " ".into(),
        ..Default::default()
    };
    assert!(config::validate(&blank).is_err());

    let slow = LookupConfig {
        blur_delay_ms: 60_000,
        ..Default::default()
    };
    assert!(config::validate(&slow).is_err());
}

#[test]
fn parses_toml_with_defaults_for_missing_keys() {
    let raw = r#"
        label = "Parent Account"
        object_api_name = "Account"
        sub_field_api_name = "Industry"
        multi_select = true
    "#;

    let cfg = config::parse(Path::new("lookup.toml"), raw).unwrap();

    assert_eq!(cfg.label, "Parent Account");
    assert_eq!(cfg.sub_field_api_name.as_deref(), Some("Industry"));
    assert!(cfg.multi_select);
    assert_eq!(cfg.limit, 5);
    assert_eq!(cfg.field_api_name, "Name");
}

#[test]
fn parses_json5_by_extension() {
    let raw = r#"{
        // comments are allowed
        object_api_name: 'Contact',
        limit: 10,
        creatable: true,
    }"#;

    let cfg = config::parse(Path::new("lookup.json5"), raw).unwrap();

    assert_eq!(cfg.object_api_name, "Contact");
    assert_eq!(cfg.limit, 10);
    assert!(cfg.creatable);
}

#[test]
fn malformed_toml_reports_path() {
    let error = config::parse(Path::new("broken.toml"), "limit = [").unwrap_err();

    assert!(matches!(error, ConfigError::Toml { .. }));
    assert!(error.to_string().contains("broken.toml"));
}

#[test]
fn save_then_load_round_trips() {
    let path = scratch_path("lookup.toml");
    let cfg = LookupConfig {
        label: "Owner".into(),
        object_label: Some("User".into()),
        object_api_name: "User".into(),
        required: true,
        ..Default::default()
    };

    config::save(&cfg, &path).unwrap();
    let loaded = config::load(Some(&path)).unwrap();

    assert_eq!(loaded, cfg);
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn load_reports_missing_file() {
    let path = scratch_path("missing.toml");

    let error = config::load(Some(&path)).unwrap_err();

    assert!(matches!(error, ConfigError::Read { .. }));
}

#[test]
fn object_label_falls_back_to_api_name() {
    let cfg = LookupConfig {
        object_api_name: "Opportunity".into(),
        ..Default::default()
    };
    assert_eq!(cfg.label_of_object(), "Opportunity");

    let labelled = LookupConfig {
        object_label: Some("Deal".into()),
        ..cfg
    };
    assert_eq!(labelled.label_of_object(), "Deal");
}
