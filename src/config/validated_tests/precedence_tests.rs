//! Tests for CLI > TOML > default resolution.

use std::time::Duration;

use crate::config::defaults;
use crate::directory::ShutdownPolicy;

use super::*;

const ONE_ENGINE: &str = r#"
    [[debounce]]
    name = "save"
    key_class = "player"
"#;

mod delay {
    use super::*;

    #[test]
    fn built_in_default_applies() {
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(ONE_ENGINE)).unwrap();

        assert_eq!(config.engines[0].delay, defaults::delay());
    }

    #[test]
    fn toml_default_beats_built_in() {
        let content = format!("[defaults]\ndelay_ms = 40\n{ONE_ENGINE}");
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(&content)).unwrap();

        assert_eq!(config.engines[0].delay, Duration::from_millis(40));
    }

    #[test]
    fn cli_default_beats_toml_default() {
        let content = format!("[defaults]\ndelay_ms = 40\n{ONE_ENGINE}");
        let config =
            ValidatedConfig::from_raw(&cli(&["--default-delay", "70"]), &toml(&content)).unwrap();

        assert_eq!(config.engines[0].delay, Duration::from_millis(70));
    }

    #[test]
    fn engine_delay_beats_every_default() {
        let content = r#"
            [defaults]
            delay_ms = 40

            [[throttle]]
            name = "chat"
            key_class = "player"
            delay_ms = 900
        "#;
        let config =
            ValidatedConfig::from_raw(&cli(&["--default-delay", "70"]), &toml(content)).unwrap();

        assert_eq!(config.engines[0].delay, Duration::from_millis(900));
    }

    #[test]
    fn zero_default_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--default-delay", "0"]), &toml(ONE_ENGINE));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDelay { ref engine }) if engine == "defaults"
        ));
    }
}

mod auto_shutdown {
    use super::*;

    #[test]
    fn defaults_to_true() {
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(ONE_ENGINE)).unwrap();

        assert!(config.engines[0].auto_shutdown);
    }

    #[test]
    fn toml_default_applies_to_unset_engines() {
        let content = r#"
            [defaults]
            auto_shutdown = false

            [[debounce]]
            name = "save"
            key_class = "player"

            [[debounce]]
            name = "sync"
            key_class = "player"
            auto_shutdown = true
        "#;
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(content)).unwrap();

        assert!(!config.engines[0].auto_shutdown);
        assert!(config.engines[1].auto_shutdown);
    }
}

mod policy {
    use super::*;

    #[test]
    fn defaults_to_auto_only() {
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(ONE_ENGINE)).unwrap();

        assert_eq!(config.policy, ShutdownPolicy::AutoOnly);
    }

    #[test]
    fn cli_flag_enables_all() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--shutdown-all"]), &toml(ONE_ENGINE)).unwrap();

        assert_eq!(config.policy, ShutdownPolicy::All);
    }

    #[test]
    fn toml_flag_enables_all() {
        let content = format!("[defaults]\nshutdown_all = true\n{ONE_ENGINE}");
        let config = ValidatedConfig::from_raw(&cli(&[]), &toml(&content)).unwrap();

        assert_eq!(config.policy, ShutdownPolicy::All);
    }

    #[test]
    fn output_flags_pass_through() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--json", "--verbose"]), &toml(ONE_ENGINE)).unwrap();

        assert!(config.json);
        assert!(config.verbose);
    }
}
