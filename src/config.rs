//! Process-level settings that sit outside the auth module.

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_FILESERVER_ROOT: &str = "static";

/// Deployment platform. Destructive admin endpoints only run on `Dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Dev,
    #[default]
    Production,
}

impl FromStr for Platform {
    type Err = Infallible;

    /// Anything other than `dev` is treated as production.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_lowercase().as_str() {
            "dev" => Platform::Dev,
            _ => Platform::Production,
        })
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub platform: Platform,
    /// Shared key the payment provider presents on webhook calls.
    pub polka_key: Option<String>,
    /// Directory served under `/app`.
    pub fileserver_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            polka_key: None,
            fileserver_root: PathBuf::from(DEFAULT_FILESERVER_ROOT),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let platform = std::env::var("CHIRPY_PLATFORM")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let polka_key = std::env::var("CHIRPY_POLKA_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let fileserver_root = std::env::var("CHIRPY_FILESERVER_ROOT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILESERVER_ROOT));

        if polka_key.is_none() {
            log::warn!("CHIRPY_POLKA_KEY not set; payment webhooks will be rejected");
        }

        Self {
            platform,
            polka_key,
            fileserver_root,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("platform", &self.platform)
            .field("polka_key", &self.polka_key.as_ref().map(|_| "<redacted>"))
            .field("fileserver_root", &self.fileserver_root)
            .finish()
    }
}
