//! Session cookie configuration.
//!
//! [`SessionToggles`] carries the raw settings (loaded by the server from
//! `HOSTEL_SESSION_*` variables or a config file). Validation depends on the
//! build mode: debug builds fall back to defaults with a warning, release
//! builds require every toggle and a key file of at least 64 bytes.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite, time::Duration};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Lifetime of a session cookie.
pub const SESSION_TTL_HOURS: i64 = 2;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const COOKIE_SECURE: &str = "session_cookie_secure";
const SAMESITE: &str = "session_samesite";
const ALLOW_EPHEMERAL: &str = "session_allow_ephemeral";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Unvalidated session toggles.
#[derive(Debug, Clone, Default)]
pub struct SessionToggles {
    /// Path of the signing key file.
    pub key_file: Option<PathBuf>,
    /// Whether cookies are marked `Secure`.
    pub cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Accept a generated key when the key file is unreadable.
    pub allow_ephemeral: Option<bool>,
}

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults are tolerated and logged.
    Debug,
    /// Every toggle must be set explicitly.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short, non-reversible identifier of the active key for logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }

    /// Cookie session middleware: HttpOnly, private content, two-hour TTL.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required setting is missing.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting is present with an unusable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than the release minimum.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure` in a release build.
    #[error("session_samesite=None requires session_cookie_secure=true")]
    InsecureSameSiteNone,
    /// Ephemeral keys in a release build.
    #[error("session_allow_ephemeral must be false in release builds")]
    EphemeralNotAllowed,
}

/// Validate session toggles for the given build mode.
///
/// # Errors
/// Release builds reject missing settings, unreadable keys and short keys.
/// Debug builds log the problem and fall back to defaults.
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = flag(toggles.cookie_secure, mode, COOKIE_SECURE, true)?;
    let same_site = same_site(toggles.same_site.as_deref(), mode, cookie_secure)?;
    let allow_ephemeral = flag(toggles.allow_ephemeral, mode, ALLOW_EPHEMERAL, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(toggles.key_file.as_ref(), mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Resolve a setting, defaulting in debug builds and failing in release.
fn lenient<T>(
    mode: BuildMode,
    fallback: T,
    err: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(error = %err, "session setting defaulted");
        Ok(fallback)
    } else {
        Err(err)
    }
}

fn flag(
    value: Option<bool>,
    mode: BuildMode,
    name: &'static str,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    match value {
        Some(flag) => Ok(flag),
        None => lenient(mode, fallback, SessionConfigError::Missing { name }),
    }
}

fn same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = value else {
        return lenient(mode, fallback, SessionConfigError::Missing { name: SAMESITE });
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => lenient(
            mode,
            fallback,
            SessionConfigError::Invalid {
                name: SAMESITE,
                value: value.to_owned(),
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn session_key(
    key_file: Option<&PathBuf>,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = key_file
        .cloned()
        .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH));
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if !mode.is_debug() && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

/// Hex of the first eight bytes of the SHA-256 of the signing key.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .get(..FINGERPRINT_BYTES)
        .map(hex::encode)
        .unwrap_or_default()
}
