//! Session configuration parsed from the environment.
//!
//! DESIGN
//! ======
//! Configuration is resolved once at startup by `SessionRuntime` and never
//! re-read. The encryption-at-rest switch in particular must stay stable for
//! the process lifetime, otherwise blobs written earlier become unreadable.
//!
//! TRADE-OFFS
//! ==========
//! Non-production builds store the session record in plain JSON so it can be
//! inspected while debugging. That default is kept, but it is an explicit
//! [`EncryptionPolicy`] that can be overridden with `SESSION_ENCRYPTION` and
//! is logged when resolved.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_STORAGE_KEY: &str = "user_info";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_API_BASE_URL: &str = "/api";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("encryption at rest is enabled but SESSION_SECRET is not set")]
    MissingSecret,
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Build flavor the client was compiled/deployed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Whether the persisted session record is encrypted at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionPolicy {
    Enabled,
    Disabled,
}

impl EncryptionPolicy {
    /// Default policy for a build mode: encrypted in production only.
    #[must_use]
    pub fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Production => Self::Enabled,
            BuildMode::Development => Self::Disabled,
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    fn parse_override(raw: Option<&str>) -> Result<Option<Self>, ConfigError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Ok(Some(Self::Enabled)),
            "off" | "false" | "0" => Ok(Some(Self::Disabled)),
            _ => Err(ConfigError::InvalidValue { key: "SESSION_ENCRYPTION", value: raw.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Key of the persisted session record slot.
    pub storage_key: String,
    pub build_mode: BuildMode,
    pub encryption: EncryptionPolicy,
    /// Secret the at-rest key is derived from. Required when encryption is enabled.
    pub secret: Option<String>,
    /// Route unauthenticated navigations are redirected to.
    pub login_path: String,
    /// Prefix joined in front of every request path by the HTTP transport.
    pub api_base_url: String,
}

impl SessionConfig {
    /// Defaults for `mode` without consulting the environment.
    #[must_use]
    pub fn new(mode: BuildMode) -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            build_mode: mode,
            encryption: EncryptionPolicy::for_mode(mode),
            secret: None,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
        }
    }

    /// Build typed session config from environment variables.
    ///
    /// Optional:
    /// - `APP_ENV`: `production` enables production defaults
    /// - `SESSION_ENCRYPTION`: `on`/`off`, overrides the build mode default
    /// - `SESSION_SECRET`: at-rest key material (required when encryption is on)
    /// - `SESSION_STORAGE_KEY`: default `user_info`
    /// - `SESSION_LOGIN_PATH`: default `/login`
    /// - `API_BASE_URL`: default `/api`
    ///
    /// A `.env` file is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] with an injected variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let build_mode = BuildMode::parse(lookup("APP_ENV").as_deref());
        let mut config = Self::new(build_mode);

        if let Some(policy) = EncryptionPolicy::parse_override(lookup("SESSION_ENCRYPTION").as_deref())? {
            config.encryption = policy;
        }
        config.secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());
        if let Some(key) = lookup("SESSION_STORAGE_KEY").filter(|s| !s.trim().is_empty()) {
            config.storage_key = key;
        }
        if let Some(path) = lookup("SESSION_LOGIN_PATH") {
            config.login_path = parse_login_path(&path)?;
        }
        if let Some(url) = lookup("API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_owned();
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, policy: EncryptionPolicy) -> Self {
        self.encryption = policy;
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Reject combinations that would make persisted data unreadable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encryption.is_enabled() && self.secret.is_none() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(BuildMode::default())
    }
}

fn parse_login_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') || trimmed.contains('?') {
        return Err(ConfigError::InvalidValue { key: "SESSION_LOGIN_PATH", value: raw.to_owned() });
    }
    Ok(trimmed.to_owned())
}
