//! Application settings and the server configuration built from them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{AssistantThread, LoggingAssistantThread};
use crate::inbound::http::session_config::SessionSettings;
use crate::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_OAUTH_BASE: &str = "http://localhost:3000";

/// Why settings could not be turned into a server configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A configured URL did not parse.
    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        /// Setting name.
        name: &'static str,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

/// Settings loaded from CLI flags, `QUILLBOARD_*` variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "QUILLBOARD")]
pub struct AppSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without it records live in process memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Base URL sign-in redirects resolve against.
    pub oauth_base_url: Option<String>,
    /// Assistant API base; conversation notes are only logged when unset.
    pub assistant_url: Option<String>,
    /// Bearer token for the assistant API.
    pub assistant_api_key: Option<String>,
    /// Per-request timeout for the assistant API, in seconds.
    #[ortho_config(default = 10)]
    pub assistant_timeout_secs: u64,
}

impl AppSettings {
    /// Configured listen address or the default.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    /// Configured pool size.
    #[must_use]
    pub const fn db_pool_size(&self) -> u32 {
        self.db_pool_size
    }

    /// Redirect base URL.
    ///
    /// # Errors
    /// [`SettingsError::InvalidUrl`] when the configured value does not parse.
    pub fn oauth_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "oauth_base_url",
            self.oauth_base_url.as_deref().unwrap_or(DEFAULT_OAUTH_BASE),
        )
    }

    /// Assistant endpoint, when configured.
    ///
    /// # Errors
    /// [`SettingsError::InvalidUrl`] when the configured value does not parse.
    pub fn assistant_endpoint(&self) -> Result<Option<AssistantEndpoint>, SettingsError> {
        self.assistant_url
            .as_deref()
            .map(|raw| {
                Ok(AssistantEndpoint {
                    url: parse_url("assistant_url", raw)?,
                    api_key: self.assistant_api_key.clone(),
                    timeout: Duration::from_secs(self.assistant_timeout_secs),
                })
            })
            .transpose()
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::InvalidUrl { name, source })
}

/// Where conversation notes are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantEndpoint {
    /// API base URL.
    pub url: Url,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) oauth_base: Url,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) assistant: Arc<dyn AssistantThread>,
}

impl ServerConfig {
    /// Configuration with in-memory storage and a logging assistant sink.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, oauth_base: Url) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            oauth_base,
            db_pool: None,
            assistant: Arc::new(LoggingAssistantThread),
        }
    }

    /// Store records in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Post conversation notes through `assistant`.
    #[must_use]
    pub fn with_assistant(mut self, assistant: Arc<dyn AssistantThread>) -> Self {
        self.assistant = assistant;
        self
    }

    /// The socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
