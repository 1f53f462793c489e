//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.server.url.is_none());
        assert!(config.server.access_key.is_none());
        assert!(config.engine.url.is_none());
        assert!(config.connection.timeout.is_none());
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn parse_server_and_engine_sections() {
        let toml = r#"
            [server]
            url = "http://events.internal:7070"
            access_key = "abc123"

            [engine]
            url = "http://engine.internal:8000"
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(
            config.server.url.as_deref(),
            Some("http://events.internal:7070")
        );
        assert_eq!(config.server.access_key.as_deref(), Some("abc123"));
        assert_eq!(
            config.engine.url.as_deref(),
            Some("http://engine.internal:8000")
        );
    }

    #[test]
    fn parse_connection_and_retry_sections() {
        let toml = r"
            [connection]
            timeout = 30
            worker_threads = 4

            [retry]
            max_attempts = 5
            initial_delay = 100
            max_delay = 2000
            multiplier = 1.5
        ";

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.connection.timeout, Some(30));
        assert_eq!(config.connection.worker_threads, Some(4));
        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.retry.initial_delay, Some(100));
        assert_eq!(config.retry.max_delay, Some(2000));
        assert_eq!(config.retry.multiplier, Some(1.5));
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[storage]\nurl = \"x\"");

        assert!(result.is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = TomlConfig::parse("[server]\nsecret = \"x\"");

        assert!(result.is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[connection]\ntimeout = \"ten\"");

        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = TomlConfig::load(std::path::Path::new("/nonexistent/pio.toml"));

        assert!(matches!(
            result,
            Err(super::super::ConfigError::FileRead { .. })
        ));
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.connection.timeout, Some(10));
        assert!(config.server.access_key.is_none());
    }

    #[test]
    fn template_mentions_every_section() {
        let template = default_config_template();

        for section in ["[server]", "[engine]", "[connection]", "[retry]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
