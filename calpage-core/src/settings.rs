//! Layered runtime settings.
//!
//! Sources apply in increasing precedence: built-in defaults, the remote
//! settings payload (a JSON blob kept alongside the deployment's secrets),
//! `CALPAGE_*` environment variables, and finally an optional local override
//! file. The last source to set a key wins.
//!
//! A missing or failing remote is survivable and degrades to a logged
//! warning; a bad override file or an unusable value is a fatal
//! configuration error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;

use crate::category::CategoryConfig;
use crate::error::{CalPageError, CalPageResult};
use crate::teams::{Club, TeamConfig};

pub const ENV_PREFIX: &str = "CALPAGE";
const ENV_EVENT_CATEGORIES: &str = "CALPAGE_EVENT_CATEGORIES";
const ENV_TEAMS: &str = "CALPAGE_TEAMS";

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_display_timezone() -> String {
    "US/Central".to_string()
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_club_name() -> String {
    "Austin FC".to_string()
}

fn default_club_abbr() -> String {
    "atx".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// IANA timezone all event times are displayed in.
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,

    /// Hostname the static site is served from.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Path prefix when the site lives under a bucket subpath.
    pub gcs_bucket_prefix: Option<String>,

    /// Club the page is built around; match slugs hang off this.
    #[serde(default = "default_club_name")]
    pub club_name: String,

    #[serde(default = "default_club_abbr")]
    pub club_abbr: String,

    /// Category definitions keyed by category name.
    #[serde(default)]
    pub event_categories: HashMap<String, CategoryConfig>,

    /// Team table keyed by abbreviation; the built-in league table is used
    /// when absent.
    pub teams: Option<HashMap<String, TeamConfig>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            calendar_id: default_calendar_id(),
            display_timezone: default_display_timezone(),
            hostname: default_hostname(),
            gcs_bucket_prefix: None,
            club_name: default_club_name(),
            club_abbr: default_club_abbr(),
            event_categories: HashMap::new(),
            teams: None,
        }
    }
}

impl Settings {
    /// Load settings from every configured source.
    pub fn load(remote: &dyn RemoteSettings, override_file: Option<&Path>) -> CalPageResult<Self> {
        Self::load_from(remote, override_file, process_env())
    }

    fn load_from(
        remote: &dyn RemoteSettings,
        override_file: Option<&Path>,
        mut env: HashMap<String, String>,
    ) -> CalPageResult<Self> {
        let mut builder = Config::builder();

        match remote.fetch_config() {
            Ok(Some(payload)) => match serde_json::from_str::<Value>(&payload) {
                Ok(Value::Object(_)) => {
                    tracing::debug!("layering remote settings payload");
                    builder = builder.add_source(File::from_str(&payload, FileFormat::Json));
                }
                Ok(_) => {
                    tracing::warn!("remote settings payload is not a JSON object, using defaults");
                }
                Err(error) => {
                    tracing::warn!(%error, "remote settings payload is not valid JSON, using defaults");
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "could not fetch remote settings, using defaults");
            }
        }

        // Structured keys arrive as JSON blobs in single variables and are
        // layered as parsed documents at the same precedence as the rest of
        // the environment.
        let category_blob = env.remove(ENV_EVENT_CATEGORIES);
        let team_blob = env.remove(ENV_TEAMS);

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(Some(env)));

        if let Some(blob) = category_blob {
            builder = builder.add_source(File::from_str(
                &format!("{{\"event_categories\":{blob}}}"),
                FileFormat::Json,
            ));
        }
        if let Some(blob) = team_blob {
            builder = builder.add_source(File::from_str(
                &format!("{{\"teams\":{blob}}}"),
                FileFormat::Json,
            ));
        }

        if let Some(path) = override_file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        let settings: Settings = builder
            .build()
            .map_err(|e| CalPageError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalPageError::Config(e.to_string()))?;

        // Surface a bad timezone at load time instead of first use.
        settings.display_tz()?;

        Ok(settings)
    }

    pub fn display_tz(&self) -> CalPageResult<Tz> {
        self.display_timezone.parse::<Tz>().map_err(|error| {
            CalPageError::Config(format!(
                "unknown display_timezone '{}': {error}",
                self.display_timezone
            ))
        })
    }

    pub fn club(&self) -> Club {
        Club {
            name: self.club_name.clone(),
            abbr: self.club_abbr.clone(),
        }
    }

    /// Root URL the rendered site is published under.
    pub fn base_url(&self) -> String {
        match self
            .gcs_bucket_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
        {
            Some(prefix) => format!("https://{}/{}", self.hostname, prefix),
            None => format!("https://{}", self.hostname),
        }
    }
}

fn process_env() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Fetches the remote settings payload.
///
/// The production implementation talks to the deployment's secrets backend;
/// it lives with the other HTTP collaborators outside this crate.
pub trait RemoteSettings {
    /// The payload, or `None` when no remote is configured.
    fn fetch_config(&self) -> CalPageResult<Option<String>>;
}

/// A remote that is never configured.
pub struct NoRemote;

impl RemoteSettings for NoRemote {
    fn fetch_config(&self) -> CalPageResult<Option<String>> {
        Ok(None)
    }
}

/// Reads the payload from a local file, standing in for the real secrets
/// backend during development.
pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRemote { path: path.into() }
    }
}

impl RemoteSettings for FileRemote {
    fn fetch_config(&self) -> CalPageResult<Option<String>> {
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }
}
