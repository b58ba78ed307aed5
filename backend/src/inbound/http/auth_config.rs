//! Authentication settings read from the environment.
//!
//! Release builds insist on an explicit signing secret; debug builds fall
//! back to a random per-process secret so local runs work without setup.
//! Secret bytes stay in [`Zeroizing`] buffers and only a fingerprint is ever
//! logged.

use actix_web::cookie::SameSite;
use chrono::Duration;
use mockable::Env;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub(crate) const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub(crate) const SECURE_COOKIE_ENV: &str = "SECURE_COOKIE";
pub(crate) const JWT_TTL_HOURS_ENV: &str = "JWT_TTL_HOURS";
pub(crate) const SAMESITE_ENV: &str = "COOKIE_SAMESITE";

/// Minimum secret length accepted in release builds.
pub const JWT_SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const DEFAULT_TTL_HOURS: i64 = 24;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const HOURS_EXPECTED: &str = "a positive whole number of hours";

/// Build mode used to decide between lenient defaults and hard failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    ///
    /// ```
    /// use grocer::inbound::http::auth_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
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

/// Validated token and cookie settings.
pub struct AuthSettings {
    /// HMAC secret for signing access tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// Token lifetime, also used as the cookie max-age.
    pub token_ttl: Duration,
    /// Whether the `jwt_token` cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl AuthSettings {
    /// Short hex digest identifying the active secret in logs.
    #[must_use]
    pub fn secret_fingerprint(&self) -> String {
        secret_fingerprint(&self.jwt_secret)
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &self.secret_fingerprint())
            .field("token_ttl", &self.token_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// Errors raised while validating authentication settings.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AuthConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("JWT_SECRET too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    #[error("COOKIE_SAMESITE=None requires SECURE_COOKIE=1")]
    InsecureSameSiteNone,
}

/// Read authentication settings for the given build mode.
///
/// # Examples
///
/// ```
/// use grocer::inbound::http::auth_config::{BuildMode, auth_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET" => Some("x".repeat(48)),
///     "SECURE_COOKIE" => Some("1".to_owned()),
///     _ => None,
/// });
///
/// let settings = auth_settings_from_env(&env, BuildMode::Release).unwrap();
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.token_ttl.num_hours(), 24);
/// ```
pub fn auth_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<AuthSettings, AuthConfigError> {
    let jwt_secret = jwt_secret_from_env(env, mode)?;
    let cookie_secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let token_ttl = token_ttl_from_env(env, mode)?;

    let settings = AuthSettings {
        jwt_secret,
        token_ttl,
        cookie_secure,
        same_site,
    };
    info!(
        fingerprint = %settings.secret_fingerprint(),
        ttl_hours = settings.token_ttl.num_hours(),
        cookie_secure,
        "authentication settings loaded"
    );
    Ok(settings)
}

fn jwt_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, AuthConfigError> {
    match env.string(JWT_SECRET_ENV) {
        Some(raw) => {
            let secret = Zeroizing::new(raw.into_bytes());
            let length = secret.len();
            if length == 0 || (!mode.is_debug() && length < JWT_SECRET_MIN_LEN) {
                return Err(AuthConfigError::SecretTooShort {
                    length,
                    min_len: JWT_SECRET_MIN_LEN,
                });
            }
            if length < JWT_SECRET_MIN_LEN {
                warn!(length, "JWT_SECRET shorter than recommended");
            }
            Ok(secret)
        }
        None if mode.is_debug() => {
            warn!("JWT_SECRET not set; using ephemeral secret (dev only)");
            let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
            rand::thread_rng().fill_bytes(&mut secret);
            Ok(secret)
        }
        None => Err(AuthConfigError::MissingEnv {
            name: JWT_SECRET_ENV,
        }),
    }
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, AuthConfigError> {
    let default = !mode.is_debug();
    let Some(value) = env.string(SECURE_COOKIE_ENV) else {
        return Ok(default);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, default, "invalid SECURE_COOKIE; using default");
            Ok(default)
        }
        None => Err(AuthConfigError::InvalidEnv {
            name: SECURE_COOKIE_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, AuthConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return Ok(SameSite::Lax);
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("COOKIE_SAMESITE=None without SECURE_COOKIE; browsers may drop the cookie");
            Ok(SameSite::None)
        }
        "none" => Err(AuthConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid COOKIE_SAMESITE; using Lax");
            Ok(SameSite::Lax)
        }
        _ => Err(AuthConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn token_ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, AuthConfigError> {
    let Some(value) = env.string(JWT_TTL_HOURS_ENV) else {
        return Ok(Duration::hours(DEFAULT_TTL_HOURS));
    };
    match value.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(Duration::hours(hours)),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid JWT_TTL_HOURS; using 24");
            Ok(Duration::hours(DEFAULT_TTL_HOURS))
        }
        _ => Err(AuthConfigError::InvalidEnv {
            name: JWT_TTL_HOURS_ENV,
            value,
            expected: HOURS_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// First eight bytes of the SHA-256 digest of `secret`, hex encoded.
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
