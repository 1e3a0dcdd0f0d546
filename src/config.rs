//! Connection and surface settings, read from the environment.

use crate::case::CaseConvention;
use crate::error::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Column naming for outlines built by the HTTP layer and migrator.
    pub case: CaseConvention,
    /// Request body limit in bytes.
    pub body_limit: usize,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            case: CaseConvention::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn with_case(mut self, case: CaseConvention) -> Self {
        self.case = case;
        self
    }

    /// Loads `.env` if present, then reads `DATABASE_URL` (required), `DATABASE_MAX_CONNECTIONS`,
    /// `OUTLINE_CASE` and `HTTP_BODY_LIMIT`.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let url = lookup("DATABASE_URL").ok_or_else(|| Error::Config("DATABASE_URL is not set".into()))?;
        let mut config = DatabaseConfig::new(url);
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("DATABASE_MAX_CONNECTIONS: '{}' is not a number", v)))?;
        }
        if let Some(v) = lookup("OUTLINE_CASE") {
            config.case = v.parse().map_err(Error::Config)?;
        }
        if let Some(v) = lookup("HTTP_BODY_LIMIT") {
            config.body_limit = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("HTTP_BODY_LIMIT: '{}' is not a number", v)))?;
        }
        Ok(config)
    }
}
