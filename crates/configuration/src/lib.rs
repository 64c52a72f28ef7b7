// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use error::ConfigError;
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings, StorageBackend};

/// Maps each supported environment variable onto its configuration key.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
    ("STORAGE_BACKEND", "storage"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_DIR", "logging.directory"),
];

/// Loads the application configuration.
///
/// Values are layered, lowest precedence first: built-in defaults suitable
/// for local development, an optional `config.toml` in the working directory,
/// and finally environment variables (a `.env` file is loaded first if present).
pub fn load_config() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_with(Some("config.toml"), |var| std::env::var(var).ok())
}

/// Same as [`load_config`], but with an explicit file and variable lookup.
pub fn load_config_with<F>(file: Option<&str>, lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000_i64)?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432_i64)?
        .set_default("database.name", "mahasiswa_db")?
        .set_default("database.user", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.max_connections", 10_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("logging.level", "info")?
        .set_default("storage", "postgres")?;

    if let Some(path) = file {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(*key, lookup(var))?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    fn load(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_with(None, move |var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_target_local_postgres() {
        let settings = load(&[]).unwrap();
        assert_eq!(settings.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.database.host, "localhost");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.database.name, "mahasiswa_db");
        assert_eq!(settings.database.user, "postgres");
        assert_eq!(settings.database.password, "postgres");
        assert_eq!(settings.storage, StorageBackend::Postgres);
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = load(&[
            ("PORT", "8080"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "kampus"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 6543);
        assert_eq!(settings.database.name, "kampus");
        assert_eq!(settings.storage, StorageBackend::Memory);
    }

    #[test]
    fn rejects_unparseable_port() {
        assert!(matches!(
            load(&[("PORT", "not-a-port")]),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn rejects_zero_pool_size() {
        assert!(matches!(
            load(&[("DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
