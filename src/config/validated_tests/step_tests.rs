//! Tests for timeline steps.

use std::time::Duration;

use crate::engine::KeyClass;

use super::*;

const ENGINES: &str = r#"
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

fn with_steps(steps: &str) -> Result<ValidatedConfig, ConfigError> {
    let content = format!("{ENGINES}\n{steps}");
    ValidatedConfig::from_raw(&cli(&[]), &toml(&content))
}

fn assert_invalid_step(result: Result<ValidatedConfig, ConfigError>, index: usize) {
    match result {
        Err(ConfigError::InvalidStep { step, .. }) => assert_eq!(step, index),
        other => panic!("expected InvalidStep for step {index}, got {other:?}"),
    }
}

mod ordering {
    use super::*;

    #[test]
    fn steps_are_sorted_by_time_keeping_file_order() {
        let config = with_steps(
            r#"
            [[step]]
            at_ms = 50
            engine = "save"
            key = "b"

            [[step]]
            at_ms = 10
            engine = "save"
            key = "a"

            [[step]]
            at_ms = 50
            engine = "save"
            key = "c"
            "#,
        )
        .unwrap();

        let keys: Vec<_> = config
            .steps
            .iter()
            .map(|step| match &step.action {
                StepAction::Invoke { key, .. } => key.clone().unwrap(),
                StepAction::Evict { .. } => panic!("unexpected eviction"),
            })
            .collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(config.span(), Duration::from_millis(50));
    }

    #[test]
    fn empty_timeline_has_zero_span() {
        let config = with_steps("").unwrap();

        assert!(config.steps.is_empty());
        assert_eq!(config.span(), Duration::ZERO);
    }
}

mod triggers {
    use super::*;

    #[test]
    fn singleton_step_takes_no_key() {
        let config = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "flush"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.steps[0].action,
            StepAction::Invoke {
                engine: "flush".to_string(),
                key: None,
                param: None,
            }
        );
    }

    #[test]
    fn parameterized_step_carries_param() {
        let config = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "chat"
            key = "alice"
            param = "hi"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.steps[0].action,
            StepAction::Invoke {
                engine: "chat".to_string(),
                key: Some("alice".to_string()),
                param: Some("hi".to_string()),
            }
        );
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "missing"
            key = "a"
            "#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::UnknownEngine { step: 0, ref name }) if name == "missing"
        ));
    }

    #[test]
    fn keyed_step_without_key_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "save"
            "#,
        );

        assert_invalid_step(result, 0);
    }

    #[test]
    fn singleton_step_with_key_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "flush"
            key = "a"
            "#,
        );

        assert_invalid_step(result, 0);
    }

    #[test]
    fn param_on_simple_engine_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "save"
            key = "a"

            [[step]]
            at_ms = 5
            engine = "save"
            key = "a"
            param = "x"
            "#,
        );

        assert_invalid_step(result, 1);
    }

    #[test]
    fn parameterized_step_without_param_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "chat"
            key = "alice"
            "#,
        );

        assert_invalid_step(result, 0);
    }
}

mod evictions {
    use super::*;

    #[test]
    fn eviction_with_aliases() {
        let config = with_steps(
            r#"
            [[step]]
            at_ms = 30
            evict = "player"
            key = "alice"
            aliases = [{ key_class = "proxy-player", key = "proxy:alice" }]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.steps[0].action,
            StepAction::Evict {
                key_class: KeyClass::from_static("player"),
                key: "alice".to_string(),
                aliases: vec![(
                    KeyClass::from_static("proxy-player"),
                    "proxy:alice".to_string()
                )],
            }
        );
    }

    #[test]
    fn eviction_needs_key() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            evict = "player"
            "#,
        );

        assert_invalid_step(result, 0);
    }

    #[test]
    fn both_engine_and_evict_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "save"
            evict = "player"
            key = "a"
            "#,
        );

        assert_invalid_step(result, 0);
    }

    #[test]
    fn neither_engine_nor_evict_is_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            key = "a"
            "#,
        );

        assert_invalid_step(result, 0);
    }

    #[test]
    fn aliases_on_trigger_are_rejected() {
        let result = with_steps(
            r#"
            [[step]]
            at_ms = 0
            engine = "save"
            key = "a"
            aliases = [{ key_class = "proxy-player", key = "b" }]
            "#,
        );

        assert_invalid_step(result, 0);
    }
}
