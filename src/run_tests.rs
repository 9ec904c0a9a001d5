//! Tests for the run module.

use super::*;
use keyed_gate::config::{Cli, TomlConfig, ValidatedConfig};
use keyed_gate::directory::ShutdownPolicy;

fn scenario(content: &str, args: &[&str]) -> ValidatedConfig {
    let mut full_args = vec!["keyed-gate"];
    full_args.extend(args);
    let cli = Cli::parse_from_iter(full_args);
    ValidatedConfig::from_raw(&cli, &TomlConfig::parse(content).unwrap()).unwrap()
}

fn keys(engine: &EngineSummary) -> Vec<Option<&str>> {
    engine.firings.iter().map(|f| f.key.as_deref()).collect()
}

mod run_error {
    use super::*;

    #[test]
    fn invoke_error_names_engine_and_time() {
        let error = RunError::Invoke {
            name: "save".to_string(),
            at: Duration::from_millis(40),
            source: EngineError::ShutDown {
                engine: "save".to_string(),
            },
        };

        let message = error.to_string();
        assert!(message.contains("40ms"));
        assert!(message.contains("'save'"));
    }

    #[test]
    fn build_error_displays_source() {
        let error = RunError::Build {
            name: "chat".to_string(),
            source: BuildError::InvalidDelay {
                delay: Duration::ZERO,
            },
        };

        assert!(error.to_string().contains("Failed to build engine 'chat'"));
    }
}

mod debounce_replay {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_coalesces_into_one_firing() {
        let config = scenario(
            r#"
            [[debounce]]
            name = "save"
            key_class = "player"
            delay_ms = 100

            [[step]]
            at_ms = 0
            engine = "save"
            key = "alice"

            [[step]]
            at_ms = 50
            engine = "save"
            key = "alice"

            [[step]]
            at_ms = 100
            engine = "save"
            key = "alice"
            "#,
            &[],
        );

        let summary = replay(&config).await.unwrap();
        let save = summary.engine("save").unwrap();

        assert_eq!(save.triggers, 3);
        assert_eq!(keys(save), [Some("alice")]);
        assert!(save.firings[0].at_ms >= 200);
    }

    #[tokio::test(start_paused = true)]
    async fn last_param_wins() {
        let config = scenario(
            r#"
            [[debounce]]
            name = "sync"
            key_class = "player"
            delay_ms = 100
            parameterized = true

            [[step]]
            at_ms = 0
            engine = "sync"
            key = "bob"
            param = "v1"

            [[step]]
            at_ms = 20
            engine = "sync"
            key = "bob"
            param = "v2"
            "#,
            &[],
        );

        let summary = replay(&config).await.unwrap();
        let sync = summary.engine("sync").unwrap();

        assert_eq!(sync.firings.len(), 1);
        assert_eq!(sync.firings[0].param.as_deref(), Some("v2"));
    }

    #[tokio::test(start_paused = true)]
    async fn singleton_fires_without_key() {
        let config = scenario(
            r#"
            [[debounce]]
            name = "flush"
            delay_ms = 30

            [[step]]
            at_ms = 0
            engine = "flush"

            [[step]]
            at_ms = 100
            engine = "flush"
            "#,
            &[],
        );

        let summary = replay(&config).await.unwrap();

        assert_eq!(keys(summary.engine("flush").unwrap()), [None, None]);
    }
}

mod throttle_replay {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn calls_inside_window_are_rejected() {
        let config = scenario(
            r#"
            [[throttle]]
            name = "chat"
            key_class = "player"
            delay_ms = 1000
            parameterized = true

            [[step]]
            at_ms = 0
            engine = "chat"
            key = "alice"
            param = "hello"

            [[step]]
            at_ms = 300
            engine = "chat"
            key = "alice"
            param = "spam"

            [[step]]
            at_ms = 1000
            engine = "chat"
            key = "alice"
            param = "again"
            "#,
            &[],
        );

        let summary = replay(&config).await.unwrap();
        let chat = summary.engine("chat").unwrap();

        assert_eq!(chat.triggers, 3);
        assert_eq!(chat.rejected, 1);
        let params: Vec<_> = chat.firings.iter().map(|f| f.param.as_deref()).collect();
        assert_eq!(params, [Some("hello"), Some("again")]);
    }
}

mod eviction_replay {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn eviction_cancels_pending_runs_across_engines() {
        let config = scenario(
            r#"
            [[debounce]]
            name = "save"
            key_class = "player"
            delay_ms = 100

            [[debounce]]
            name = "proxy-save"
            key_class = "proxy-player"
            delay_ms = 100

            [[step]]
            at_ms = 0
            engine = "save"
            key = "alice"

            [[step]]
            at_ms = 0
            engine = "proxy-save"
            key = "proxy:alice"

            [[step]]
            at_ms = 0
            engine = "save"
            key = "bob"

            [[step]]
            at_ms = 50
            evict = "player"
            key = "alice"
            aliases = [{ key_class = "proxy-player", key = "proxy:alice" }]
            "#,
            &[],
        );

        let summary = replay(&config).await.unwrap();

        assert_eq!(summary.evicted, 2);
        assert_eq!(keys(summary.engine("save").unwrap()), [Some("bob")]);
        assert!(summary.engine("proxy-save").unwrap().firings.is_empty());
    }
}

mod shutdown_replay {
    use super::*;

    const MIXED: &str = r#"
        [[debounce]]
        name = "save"
        key_class = "player"
        delay_ms = 50

        [[throttle]]
        name = "chat"
        key_class = "player"
        delay_ms = 50
        auto_shutdown = false
    "#;

    #[tokio::test(start_paused = true)]
    async fn auto_only_leaves_opted_out_engines() {
        let config = scenario(MIXED, &[]);

        let summary = replay(&config).await.unwrap();

        assert_eq!(summary.shutdown.shut_down, 1);
        assert_eq!(summary.shutdown.skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_all_flag_reaches_every_engine() {
        let config = scenario(MIXED, &["--shutdown-all"]);
        assert_eq!(config.policy, ShutdownPolicy::All);

        let summary = replay(&config).await.unwrap();

        assert_eq!(summary.shutdown.shut_down, 2);
        assert_eq!(summary.shutdown.skipped, 0);
    }
}

mod rendering {
    use super::*;

    fn sample() -> Summary {
        Summary {
            engines: vec![EngineSummary {
                name: "chat".to_string(),
                kind: EngineKind::Throttle,
                shape: KeyShape::Simple,
                key_class: "player".to_string(),
                triggers: 3,
                rejected: 1,
                firings: vec![
                    Firing {
                        at_ms: 0,
                        key: Some("alice".to_string()),
                        param: None,
                    },
                    Firing {
                        at_ms: 1000,
                        key: Some("alice".to_string()),
                        param: None,
                    },
                ],
            }],
            evicted: 0,
            shutdown: ShutdownReport {
                shut_down: 1,
                skipped: 0,
            },
            elapsed_ms: 2010,
        }
    }

    #[test]
    fn text_lists_engines_and_totals() {
        let text = render(&sample(), false).unwrap();

        assert!(text.starts_with("ENGINE"));
        assert!(text.contains("chat"));
        assert!(text.contains("throttle"));
        assert!(text.contains("elapsed: 2010ms"));
    }

    #[test]
    fn json_is_structured() {
        let json = render(&sample(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["engines"][0]["name"], "chat");
        assert_eq!(value["engines"][0]["kind"], "throttle");
        assert_eq!(value["engines"][0]["firings"][1]["at_ms"], 1000);
        assert!(value["engines"][0]["firings"][0].get("param").is_none());
        assert_eq!(value["shutdown"]["shut_down"], 1);
    }
}
