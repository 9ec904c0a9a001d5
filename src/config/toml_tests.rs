//! Tests for TOML scenario parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_file() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.debounce.is_empty());
        assert!(config.throttle.is_empty());
        assert!(config.steps.is_empty());
        assert!(config.defaults.delay_ms.is_none());
        assert!(!config.defaults.shutdown_all);
    }

    #[test]
    fn parse_defaults_section() {
        let toml = r"
            [defaults]
            delay_ms = 250
            auto_shutdown = false
            shutdown_all = true
        ";

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.defaults.delay_ms, Some(250));
        assert_eq!(config.defaults.auto_shutdown, Some(false));
        assert!(config.defaults.shutdown_all);
    }

    #[test]
    fn parse_engine_tables() {
        let toml = r#"
            [[debounce]]
            name = "save"
            key_class = "player"
            delay_ms = 200

            [[debounce]]
            name = "flush"

            [[throttle]]
            name = "chat"
            key_class = "player"
            parameterized = true
            auto_shutdown = false
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.debounce.len(), 2);
        assert_eq!(config.debounce[0].name, "save");
        assert_eq!(config.debounce[0].delay_ms, Some(200));
        assert!(config.debounce[1].key_class.is_none());
        assert!(!config.debounce[1].parameterized);

        let chat = &config.throttle[0];
        assert!(chat.parameterized);
        assert_eq!(chat.auto_shutdown, Some(false));
    }

    #[test]
    fn parse_steps() {
        let toml = r#"
            [[step]]
            at_ms = 10
            engine = "chat"
            key = "alice"
            param = "hi"

            [[step]]
            at_ms = 20
            evict = "player"
            key = "alice"
            aliases = [{ key_class = "proxy-player", key = "proxy:alice" }]
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[0].engine.as_deref(), Some("chat"));
        assert_eq!(config.steps[0].param.as_deref(), Some("hi"));
        assert_eq!(config.steps[1].evict.as_deref(), Some("player"));
        assert_eq!(config.steps[1].aliases[0].key_class, "proxy-player");
        assert_eq!(config.steps[1].aliases[0].key, "proxy:alice");
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_field_is_rejected() {
        let toml = r#"
            [[debounce]]
            name = "save"
            window = 10
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn step_without_time_is_rejected() {
        let toml = r#"
            [[step]]
            engine = "save"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn negative_delay_is_rejected() {
        let toml = r#"
            [[throttle]]
            name = "chat"
            delay_ms = -5
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn invalid_syntax_is_rejected() {
        assert!(TomlConfig::parse("[[debounce]\nname = ").is_err());
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.defaults.delay_ms, Some(500));
        assert_eq!(config.debounce.len(), 1);
        assert_eq!(config.throttle.len(), 1);
        assert_eq!(config.steps.len(), 4);
    }
}
