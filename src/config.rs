use serde::{Deserialize, Serialize};

use crate::logic::RecordNumberGenerator;
use crate::model::{DateParser, DEFAULT_DATE_FORMATS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub records: RecordsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are answered with 408
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: Option<u32>,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub sqlx_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    pub number_prefix: String,
    /// Tried in order; `rfc3339` or a chrono format string
    pub accepted_date_formats: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "ekarte_user".to_string(),
            password: "ekarte_password".to_string(),
            name: "ekarte_db".to_string(),
            max_connections: Some(20),
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sqlx_level: "warn".to_string(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            number_prefix: "MR".to_string(),
            accepted_date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and
    /// `EKARTE_*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config::Environment::with_prefix("EKARTE"))
    }

    fn load_from(environment: config::Environment) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Nested keys use a double underscore: EKARTE_DATABASE__HOST
        config = config.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("records.accepted_date_formats")
                .try_parsing(true),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Reject settings that would only fail later, at request time
    pub fn validate(&self) -> anyhow::Result<()> {
        RecordNumberGenerator::try_new(&self.records.number_prefix)?;
        Ok(())
    }

    /// Get the database URL from config, `DATABASE_URL`, or the individual parts
    pub fn database_url(&self) -> String {
        if let Some(connection_string) = &self.database.connection_string {
            if !connection_string.trim().is_empty() {
                return connection_string.clone();
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }

        let db = &self.database;
        format!(
            "postgres://{}:{}@{}:{}/{}",
            db.user, db.password, db.host, db.port, db.name
        )
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn date_parser(&self) -> DateParser {
        DateParser::from_config(
            self.records
                .accepted_date_formats
                .iter()
                .map(String::as_str),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn try_load_with(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_from(config::Environment::with_prefix("EKARTE").source(Some(source)))
    }

    fn load_with(vars: &[(&str, &str)]) -> AppConfig {
        try_load_with(vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]);
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.database.name, "ekarte_db");
        assert_eq!(config.records.number_prefix, "MR");
        assert_eq!(config.date_parser(), DateParser::default());
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let config = load_with(&[
            ("EKARTE_SERVER__PORT", "9090"),
            ("EKARTE_DATABASE__HOST", "db.internal"),
            ("EKARTE_DATABASE__RUN_MIGRATIONS", "false"),
            ("EKARTE_RECORDS__ACCEPTED_DATE_FORMATS", "%Y-%m-%d,%Y/%m/%d"),
        ]);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.host, "db.internal");
        assert!(!config.database.run_migrations);
        assert_eq!(config.records.accepted_date_formats, vec!["%Y-%m-%d", "%Y/%m/%d"]);
        assert!(config.date_parser().try_parse("2026/01/25").is_some());
    }

    #[test]
    fn test_overlong_record_prefix_is_rejected() {
        let err = try_load_with(&[("EKARTE_RECORDS__NUMBER_PREFIX", "CLINIC-RECORD-PREFIX1")])
            .unwrap_err();
        assert!(err.to_string().contains("record number prefix"));

        let config = load_with(&[("EKARTE_RECORDS__NUMBER_PREFIX", "KR")]);
        assert_eq!(config.records.number_prefix, "KR");
    }

    #[test]
    fn test_connection_string_wins() {
        let mut config = AppConfig::default();
        config.database.connection_string = Some("postgres://a:b@c:1/d".to_string());
        assert_eq!(config.database_url(), "postgres://a:b@c:1/d");
    }
}
