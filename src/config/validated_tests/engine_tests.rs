//! Tests for engine definitions.

use crate::engine::{EngineKind, KeyClass, KeyShape};

use super::*;

#[test]
fn shapes_follow_key_class_and_parameterized() {
    let content = r#"
        [[debounce]]
        name = "flush"

        [[debounce]]
        name = "save"
        key_class = "player"

        [[throttle]]
        name = "chat"
        key_class = "player"
        parameterized = true
    "#;
    let config = ValidatedConfig::from_raw(&cli(&[]), &toml(content)).unwrap();

    let flush = config.engine("flush").unwrap();
    assert_eq!(flush.shape, KeyShape::Singleton);
    assert_eq!(flush.key_class, KeyClass::UNIT);
    assert_eq!(flush.kind, EngineKind::Debounce);

    assert_eq!(config.engine("save").unwrap().shape, KeyShape::Simple);

    let chat = config.engine("chat").unwrap();
    assert_eq!(chat.shape, KeyShape::Parameterized);
    assert_eq!(chat.kind, EngineKind::Throttle);
    assert_eq!(chat.key_class.as_str(), "player");
}

#[test]
fn debounces_come_before_throttles() {
    let content = r#"
        [[throttle]]
        name = "chat"
        key_class = "player"

        [[debounce]]
        name = "save"
        key_class = "player"
    "#;
    let config = ValidatedConfig::from_raw(&cli(&[]), &toml(content)).unwrap();

    let names: Vec<_> = config.engines.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["save", "chat"]);
}

#[test]
fn duplicate_name_across_kinds_is_rejected() {
    let content = r#"
        [[debounce]]
        name = "gate"
        key_class = "player"

        [[throttle]]
        name = "gate"
        key_class = "player"
    "#;
    let result = ValidatedConfig::from_raw(&cli(&[]), &toml(content));

    assert!(matches!(
        result,
        Err(ConfigError::DuplicateEngine { ref name }) if name == "gate"
    ));
}

#[test]
fn zero_engine_delay_is_rejected() {
    let content = r#"
        [[throttle]]
        name = "chat"
        key_class = "player"
        delay_ms = 0
    "#;
    let result = ValidatedConfig::from_raw(&cli(&[]), &toml(content));

    assert!(matches!(
        result,
        Err(ConfigError::InvalidDelay { ref engine }) if engine == "chat"
    ));
}

#[test]
fn blank_key_class_is_rejected() {
    let content = r#"
        [[debounce]]
        name = "save"
        key_class = "  "
    "#;
    let result = ValidatedConfig::from_raw(&cli(&[]), &toml(content));

    assert!(matches!(result, Err(ConfigError::InvalidKeyClass { .. })));
}

#[test]
fn max_delay_spans_all_engines() {
    let content = r#"
        [[debounce]]
        name = "save"
        key_class = "player"
        delay_ms = 100

        [[throttle]]
        name = "chat"
        key_class = "player"
        delay_ms = 700
    "#;
    let config = ValidatedConfig::from_raw(&cli(&[]), &toml(content)).unwrap();

    assert_eq!(config.max_delay(), std::time::Duration::from_millis(700));
}

#[test]
fn display_summarizes_scenario() {
    let config = ValidatedConfig::from_raw(&cli(&[]), &toml(ONE_SAVE)).unwrap();
    let display = config.to_string();

    assert!(display.contains("debounce: 1"));
    assert!(display.contains("throttle: 0"));
    assert!(display.contains("AutoOnly"));
}

const ONE_SAVE: &str = r#"
    [[debounce]]
    name = "save"
    key_class = "player"
"#;
