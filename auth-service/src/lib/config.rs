use std::env;
use std::fmt;
use std::time::Duration;

use auth::WorkFactor;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

const MIN_SECRET_BYTES: usize = 32;

/// Flat settings as they appear in files and the environment
/// (`SERVER_PORT` -> `server_port`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_port: u16,
    pub server_read_timeout: u64,
    pub server_write_timeout: u64,
    pub server_idle_timeout: u64,

    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,

    pub jwt_secret: Option<String>,
    pub jwt_expiry_hours: i64,
    pub jwt_expiry_seconds: Option<i64>,
    pub jwt_refresh_hours: i64,

    pub cors_allowed_origins: String,

    pub maintenance_interval_seconds: u64,

    pub password_memory_kib: Option<u32>,
    pub password_iterations: Option<u32>,
    pub password_parallelism: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub maintenance: MaintenanceConfig,
    pub password: WorkFactor,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub interval: Duration,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SERVER_PORT, JWT_SECRET, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let settings: Settings = configuration.try_deserialize()?;

        Config::try_from(settings)
    }

    /// Builder seeded with the built-in default of every optional setting.
    pub fn defaults() -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server_port", 8080)?
            .set_default("server_read_timeout", 15)?
            .set_default("server_write_timeout", 15)?
            .set_default("server_idle_timeout", 60)?
            .set_default("db_host", "localhost")?
            .set_default("db_port", 5432)?
            .set_default("db_user", "postgres")?
            .set_default("db_password", "postgres")?
            .set_default("db_name", "auth")?
            .set_default("db_max_connections", 5)?
            .set_default("jwt_expiry_hours", 24)?
            .set_default("jwt_refresh_hours", 168)?
            .set_default("cors_allowed_origins", "*")?
            .set_default("maintenance_interval_seconds", 60)
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let secret = settings
            .jwt_secret
            .ok_or_else(|| ConfigError::Message("JWT_SECRET must be set".to_string()))?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        let access_ttl = match settings.jwt_expiry_seconds {
            Some(seconds) => chrono::Duration::seconds(seconds),
            None => chrono::Duration::hours(settings.jwt_expiry_hours),
        };
        let refresh_ttl = chrono::Duration::hours(settings.jwt_refresh_hours);

        if access_ttl <= chrono::Duration::zero() {
            return Err(ConfigError::Message(
                "Access token lifetime must be positive".to_string(),
            ));
        }
        if refresh_ttl <= access_ttl {
            return Err(ConfigError::Message(
                "JWT_REFRESH_HOURS must exceed the access token lifetime".to_string(),
            ));
        }

        for (name, value) in [
            ("SERVER_READ_TIMEOUT", settings.server_read_timeout),
            ("SERVER_WRITE_TIMEOUT", settings.server_write_timeout),
            ("SERVER_IDLE_TIMEOUT", settings.server_idle_timeout),
            ("MAINTENANCE_INTERVAL_SECONDS", settings.maintenance_interval_seconds),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{} must be positive", name)));
            }
        }

        let defaults = WorkFactor::default();
        let password = WorkFactor {
            memory_kib: settings.password_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: settings.password_iterations.unwrap_or(defaults.iterations),
            parallelism: settings.password_parallelism.unwrap_or(defaults.parallelism),
        };

        let allowed_origins = settings
            .cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Config {
            server: ServerConfig {
                port: settings.server_port,
                read_timeout: Duration::from_secs(settings.server_read_timeout),
                write_timeout: Duration::from_secs(settings.server_write_timeout),
                idle_timeout: Duration::from_secs(settings.server_idle_timeout),
            },
            database: DatabaseConfig {
                host: settings.db_host,
                port: settings.db_port,
                user: settings.db_user,
                password: settings.db_password,
                name: settings.db_name,
                max_connections: settings.db_max_connections,
            },
            jwt: JwtConfig {
                secret,
                access_ttl,
                refresh_ttl,
            },
            cors: CorsConfig { allowed_origins },
            maintenance: MaintenanceConfig {
                interval: Duration::from_secs(settings.maintenance_interval_seconds),
            },
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings_with(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Config::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_from(settings_with(&[("jwt_secret", SECRET)]).unwrap()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.read_timeout, Duration::from_secs(15));
        assert_eq!(config.server.write_timeout, Duration::from_secs(15));
        assert_eq!(config.server.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.database.name, "auth");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.access_ttl, chrono::Duration::hours(24));
        assert_eq!(config.jwt.refresh_ttl, chrono::Duration::hours(168));
        assert_eq!(config.cors.allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.maintenance.interval, Duration::from_secs(60));
        assert_eq!(config.password, WorkFactor::default());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        assert!(Config::try_from(settings_with(&[]).unwrap()).is_err());
    }

    #[test]
    fn test_load_without_secret_in_environment_fails() {
        env::remove_var("JWT_SECRET");
        env::remove_var("RUN_MODE");

        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET must be set"));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let settings = settings_with(&[("jwt_secret", "too-short")]).unwrap();
        assert!(Config::try_from(settings).is_err());
    }

    #[test]
    fn test_expiry_seconds_override() {
        let settings =
            settings_with(&[("jwt_secret", SECRET), ("jwt_expiry_seconds", "1")]).unwrap();
        let config = Config::try_from(settings).unwrap();

        assert_eq!(config.jwt.access_ttl, chrono::Duration::seconds(1));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let settings = settings_with(&[
            ("jwt_secret", SECRET),
            ("jwt_expiry_hours", "24"),
            ("jwt_refresh_hours", "24"),
        ])
        .unwrap();
        assert!(Config::try_from(settings).is_err());
    }

    #[test]
    fn test_cors_origins_are_split() {
        let settings = settings_with(&[
            ("jwt_secret", SECRET),
            (
                "cors_allowed_origins",
                "https://a.example, https://b.example,",
            ),
        ])
        .unwrap();
        let config = Config::try_from(settings).unwrap();

        assert_eq!(
            config.cors.allowed_origins,
            vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ]
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::try_from(settings_with(&[("jwt_secret", SECRET)]).unwrap()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("password: \"postgres\""));
    }
}
