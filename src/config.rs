//! Configuration loading
//!
//! Configuration lives in a TOML file, by default at
//! `<config dir>/gatekeep/config.toml`.

use crate::error::{Error, Result};
use crate::permissions::PermissionRanking;
use crate::types::RepositoryPermission;
use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Directory name under the user config directory
const CONFIG_DIR: &str = "gatekeep";

/// Filename of the configuration file
const CONFIG_FILE: &str = "config.toml";

/// Longest accepted review waiting period
pub const MAX_REVIEW_DURATION: TimeDelta = TimeDelta::days(365);

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Repository, team and review-timing settings
    pub github: GitHubConfig,
}

/// GitHub repository and review policy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Owning organization of the repository and the reviewer team
    pub organization: String,
    /// Name of the home repository
    pub repository: String,
    /// Slug of the designated reviewer team
    pub reviewers_team: String,
    /// Label marking the pull requests this tool considers
    #[serde(default = "default_target_label")]
    pub target_label: String,
    /// Label that switches a PR to the short review duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_review_label: Option<String>,
    /// Normal waiting period after the clock-start review
    #[serde(default = "default_review_duration", with = "duration_format")]
    pub review_duration: TimeDelta,
    /// Shortened waiting period for PRs carrying `short_review_label`
    #[serde(default = "default_short_review_duration", with = "duration_format")]
    pub short_review_duration: TimeDelta,
    /// Minimum permission that makes a change request a veto
    #[serde(default = "default_minimum_permission")]
    pub minimum_permission: RepositoryPermission,
    /// Permission levels from lowest to highest privilege
    #[serde(default)]
    pub permission_ranking: PermissionRanking,
    /// GitHub Enterprise host (None for github.com)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

fn default_target_label() -> String {
    "mappings".to_string()
}

fn default_review_duration() -> TimeDelta {
    TimeDelta::hours(48)
}

fn default_short_review_duration() -> TimeDelta {
    TimeDelta::hours(24)
}

const fn default_minimum_permission() -> RepositoryPermission {
    RepositoryPermission::Write
}

impl Config {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let github = &self.github;
        for (name, value) in [
            ("organization", &github.organization),
            ("repository", &github.repository),
            ("reviewers_team", &github.reviewers_team),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("github.{name} must not be empty")));
            }
        }
        for (name, value) in [
            ("review_duration", github.review_duration),
            ("short_review_duration", github.short_review_duration),
        ] {
            if value < TimeDelta::zero() {
                return Err(Error::Config(format!("github.{name} must not be negative")));
            }
            if value > MAX_REVIEW_DURATION {
                return Err(Error::Config(format!(
                    "github.{name} must not exceed {}",
                    format_duration(MAX_REVIEW_DURATION)
                )));
            }
        }
        github.permission_ranking.validate()?;
        if github.permission_ranking.rank(github.minimum_permission).is_none() {
            return Err(Error::Config(format!(
                "github.minimum_permission {} is not part of github.permission_ranking",
                github.minimum_permission
            )));
        }
        Ok(())
    }
}

/// Default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from `path`, or from the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path().ok_or_else(|| {
            Error::Config("could not determine the user config directory".to_string())
        })?,
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    Config::from_toml_str(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?)(?:(\d+)[dD])?(?:(\d+)[hH])?(?:(\d+)[mM])?(?:(\d+)[sS])?$")
        .expect("duration pattern is valid")
});

/// Parse a compact duration such as `48h`, `1d12h` or `90m`
pub fn parse_duration(input: &str) -> Result<TimeDelta> {
    let input = input.trim();
    if input == "0" {
        return Ok(TimeDelta::zero());
    }

    let invalid = || Error::Config(format!("invalid duration {input:?}"));
    let caps = DURATION.captures(input).ok_or_else(invalid)?;

    let units: [(usize, fn(i64) -> Option<TimeDelta>); 4] = [
        (2, TimeDelta::try_days),
        (3, TimeDelta::try_hours),
        (4, TimeDelta::try_minutes),
        (5, TimeDelta::try_seconds),
    ];

    let mut total = TimeDelta::zero();
    let mut matched = false;
    for (group, to_delta) in units {
        if let Some(m) = caps.get(group) {
            matched = true;
            let amount: i64 = m.as_str().parse().map_err(|_| invalid())?;
            let part = to_delta(amount).ok_or_else(invalid)?;
            total = total.checked_add(&part).ok_or_else(invalid)?;
        }
    }
    if !matched {
        return Err(invalid());
    }

    if &caps[1] == "-" {
        total = -total;
    }
    Ok(total)
}

/// Format a duration in the compact form accepted by [`parse_duration`]
///
/// Sub-second precision is dropped.
pub fn format_duration(duration: TimeDelta) -> String {
    let mut seconds = duration.num_seconds();
    if seconds == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    if seconds < 0 {
        out.push('-');
        seconds = -seconds;
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    for (amount, unit) in [(days, 'd'), (hours, 'h'), (minutes, 'm'), (secs, 's')] {
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push(unit);
        }
    }
    out
}

mod duration_format {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
