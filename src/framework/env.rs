//! Runtime environment selection.

use crate::framework::error::EnvError;
use std::fmt;
use std::str::FromStr;

/// Name of the variable read by [`Env::from_env`].
pub const ENV_VAR: &str = "SERVICE_ENV";

/// The environment a service runs in. Handed to every module's `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Env {
    #[default]
    Development,
    Test,
    Production,
}

impl Env {
    /// Reads `SERVICE_ENV`, falling back to [`Env::Development`] when unset.
    pub fn from_env() -> Result<Self, EnvError> {
        match std::env::var(ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Env::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Development => "development",
            Env::Test => "test",
            Env::Production => "production",
        }
    }
}

impl FromStr for Env {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Env::Development),
            "test" => Ok(Env::Test),
            "production" | "prod" => Ok(Env::Production),
            other => Err(EnvError(other.to_string())),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
