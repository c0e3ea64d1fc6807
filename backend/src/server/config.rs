//! Server settings loaded via OrthoConfig.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use hostel_backend::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration merged from defaults, config files and `HOSTEL_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTEL")]
pub struct ServerSettings {
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// Session signing key file.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub session_samesite: Option<String>,
    /// Accept a generated session key when the key file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
    /// Username of the admin account created at start-up.
    pub bootstrap_admin_username: Option<String>,
    /// Password of the bootstrap admin.
    pub bootstrap_admin_password: Option<String>,
}

/// Failure to interpret loaded settings.
#[derive(Debug, thiserror::Error)]
#[error("invalid bind address '{value}': {source}")]
pub struct BindAddrError {
    value: String,
    #[source]
    source: std::net::AddrParseError,
}

impl ServerSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    /// Returns [`BindAddrError`] when the configured address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| BindAddrError {
            value: value.to_owned(),
            source,
        })
    }

    /// Session toggles for validation by the HTTP adapter.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure,
            same_site: self.session_samesite.clone(),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }

    /// Bootstrap admin credentials when both halves are configured.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        self.bootstrap_admin_username
            .as_deref()
            .zip(self.bootstrap_admin_password.as_deref())
    }
}
