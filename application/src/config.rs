//! [`Config`]-related definitions.

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::domain::purchase;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Service configuration.
    #[serde(default)]
    pub service: Service,

    /// Postgres configuration.
    #[serde(default)]
    pub postgres: Postgres,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Names of the cards always listed in the per-card summary, even
    /// without any purchase on them.
    #[default(DEFAULT_KNOWN_CARDS.iter().copied().map(str::to_owned).collect())]
    pub known_cards: Vec<String>,
}

/// Card names the per-card summary is seeded with by default.
const DEFAULT_KNOWN_CARDS: &[&str] = &[
    "Banco Pan",
    "Atacadão",
    "Nubank",
    "Santander",
    "Riachuello",
    "Le Bescuit",
    "C&A",
    "Renner",
    "Mercado Livre",
    "Cartão Mais",
    "Mais",
    "Brasil Card",
    "Azul Atacarejo",
];

impl TryFrom<Service> for service::Config {
    type Error = String;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service { known_cards } = value;

        Ok(Self {
            known_cards: known_cards
                .into_iter()
                .map(|name| {
                    purchase::Card::new(name.as_str())
                        .ok_or_else(|| format!("`{name}` is not a valid card"))
                })
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use config::{builder::DefaultState, ConfigBuilder, FileFormat};

    use super::{Config, LogLevel};

    fn from_toml(toml: &str) -> Config {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_when_nothing_is_provided() {
        let conf = from_toml("");

        assert_eq!(conf.server.host, "0.0.0.0");
        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.postgres.port, 5432);
        assert_eq!(conf.log.level, LogLevel::Info);
        assert_eq!(conf.service.known_cards.len(), 13);
        assert_eq!(conf.service.known_cards[0], "Banco Pan");
    }

    #[test]
    fn overrides_known_cards() {
        let conf = from_toml(
            r#"
            [service]
            known_cards = ["Nubank", "Inter"]

            [log]
            level = "DEBUG"
            "#,
        );

        assert_eq!(conf.service.known_cards, ["Nubank", "Inter"]);
        assert_eq!(conf.log.level, LogLevel::Debug);
        assert_eq!(conf.server.port, 8080);
    }

    #[test]
    fn converts_known_cards_into_service_config() {
        let conf: service::Config = from_toml("").service.try_into().unwrap();

        assert_eq!(conf.known_cards.len(), 13);
        assert_eq!(conf.known_cards[12].to_string(), "Azul Atacarejo");
    }

    #[test]
    fn rejects_blank_card_name() {
        let res = service::Config::try_from(super::Service {
            known_cards: vec!["Nubank".into(), "   ".into()],
        });

        assert!(res.is_err());
    }
}
