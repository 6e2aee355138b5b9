//! Configuration Management
//!
//! Layered configuration: defaults, then an optional JSON file, then
//! environment variables, then CLI flags (applied by `main`). The result is
//! validated once into [`Settings`] before any network call.

use crate::discovery::TagFilter;
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

pub const ENV_BASE_URL: &str = "LEANIX_API_BASE_URL";
pub const ENV_API_TOKEN: &str = "LEANIX_API_TOKEN";
pub const ENV_APPLICATION: &str = "LEANIX_APPLICATION_NAME";
pub const ENV_TAG_KEY: &str = "SYNC_TAG_KEY";
pub const ENV_TAG_VALUE: &str = "SYNC_TAG_VALUE";
pub const ENV_ACTOR: &str = "SYNC_ACTOR";
pub const ENV_AWS_REGION: &str = "SYNC_AWS_REGION";

const DEFAULT_TAG_KEY: &str = "project";
const DEFAULT_TAG_VALUE: &str = "ABC";

/// Raw, possibly incomplete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LeanIX workspace URL, e.g. `https://acme.leanix.net`
    pub base_url: Option<String>,
    /// LeanIX API token; never written back out
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Name of the Application fact sheet components are linked to
    pub application_name: Option<String>,
    pub tag_key: String,
    pub tag_value: String,
    /// Who is running the sync, recorded in the report
    pub actor: Option<String>,
    pub aws_region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            application_name: None,
            tag_key: DEFAULT_TAG_KEY.to_string(),
            tag_value: DEFAULT_TAG_VALUE.to_string(),
            actor: None,
            aws_region: None,
        }
    }
}

impl Config {
    /// Default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tagsync").join("config.json"))
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = serde_json::from_str(&content).map_err(|e| {
            SyncError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from any variable source; empty values are ignored
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = Some(v);
        }
        if let Some(v) = get(ENV_API_TOKEN) {
            self.api_token = Some(v);
        }
        if let Some(v) = get(ENV_APPLICATION) {
            self.application_name = Some(v);
        }
        if let Some(v) = get(ENV_TAG_KEY) {
            self.tag_key = v;
        }
        if let Some(v) = get(ENV_TAG_VALUE) {
            self.tag_value = v;
        }
        if let Some(v) = get(ENV_ACTOR).or_else(|| get("USER")) {
            self.actor = Some(v);
        }
        if let Some(v) = get(ENV_AWS_REGION) {
            self.aws_region = Some(v);
        }
    }

    /// Check required values and normalize them
    pub fn validate(self) -> Result<Settings> {
        let base_url = self
            .base_url
            .ok_or_else(|| SyncError::Config(format!("{ENV_BASE_URL} is not set")))?;
        let parsed = Url::parse(&base_url)
            .map_err(|e| SyncError::Config(format!("Invalid base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "Base URL must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        let api_token = self
            .api_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::Config(format!("{ENV_API_TOKEN} is not set")))?;
        let application_name = self
            .application_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| SyncError::Config(format!("{ENV_APPLICATION} is not set")))?;

        if self.tag_key.is_empty() {
            return Err(SyncError::Config("Tag key must not be empty".to_string()));
        }

        Ok(Settings {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            application_name,
            filter: TagFilter::new(&self.tag_key, &self.tag_value),
            actor: self.actor.unwrap_or_else(|| "unknown".to_string()),
            aws_region: self.aws_region,
        })
    }
}

/// Validated configuration for one run
#[derive(Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_token: String,
    pub application_name: String,
    pub filter: TagFilter,
    pub actor: String,
    pub aws_region: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_token", &"***")
            .field("application_name", &self.application_name)
            .field("filter", &self.filter)
            .field("actor", &self.actor)
            .field("aws_region", &self.aws_region)
            .finish()
    }
}

/// Timestamps fixed at the start of a run
#[derive(Debug, Clone)]
pub struct RunClock {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl RunClock {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub fn timestamp(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// `YYYY-MM-DD`, UTC
    pub fn date(&self) -> String {
        self.started_at.format("%Y-%m-%d").to_string()
    }
}

/// Today's UTC date as `YYYY-MM-DD`
pub fn utc_today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn complete() -> Config {
        Config {
            base_url: Some("https://acme.leanix.net/".into()),
            api_token: Some("secret-token-123".into()),
            application_name: Some("Billing".into()),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_use_project_abc_filter() {
        let config = Config::default();
        assert_eq!(config.tag_key, "project");
        assert_eq!(config.tag_value, "ABC");
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "https://env.leanix.net"),
            (ENV_TAG_VALUE, "XYZ"),
            (ENV_APPLICATION, "  "),
            ("USER", "alice"),
        ]);
        let mut config = complete();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_url.as_deref(), Some("https://env.leanix.net"));
        assert_eq!(config.tag_value, "XYZ");
        // blank values do not override
        assert_eq!(config.application_name.as_deref(), Some("Billing"));
        assert_eq!(config.actor.as_deref(), Some("alice"));
    }

    #[test]
    fn explicit_actor_wins_over_user() {
        let vars: HashMap<&str, &str> = HashMap::from([(ENV_ACTOR, "ci-bot"), ("USER", "alice")]);
        let mut config = Config::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.actor.as_deref(), Some("ci-bot"));
    }

    #[test]
    fn validate_trims_base_url_and_defaults_actor() {
        let settings = complete().validate().unwrap();
        assert_eq!(settings.base_url, "https://acme.leanix.net");
        assert_eq!(settings.actor, "unknown");
        assert_eq!(settings.filter, TagFilter::new("project", "ABC"));
    }

    #[test]
    fn validate_rejects_missing_or_bad_values() {
        let mut no_token = complete();
        no_token.api_token = None;
        assert!(matches!(no_token.validate(), Err(SyncError::Config(_))));

        let mut bad_url = complete();
        bad_url.base_url = Some("not a url".into());
        assert!(matches!(bad_url.validate(), Err(SyncError::Config(_))));

        let mut ftp = complete();
        ftp.base_url = Some("ftp://acme.leanix.net".into());
        assert!(matches!(ftp.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn settings_debug_hides_token() {
        let settings = complete().validate().unwrap();
        assert!(!format!("{settings:?}").contains("secret-token-123"));
    }

    #[test]
    fn api_token_is_never_serialized() {
        let json = serde_json::to_string(&complete()).unwrap();
        assert!(!json.contains("secret-token-123"));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"application_name": "Billing", "tag_value": "DEF"}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.application_name.as_deref(), Some("Billing"));
        assert_eq!(config.tag_key, "project");
        assert_eq!(config.tag_value, "DEF");
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/tagsync.json")));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn run_clock_formats() {
        let clock = RunClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 3, 7).unwrap());
        assert_eq!(clock.timestamp(), "2024-05-01 09:03:07");
        assert_eq!(clock.date(), "2024-05-01");
    }
}
