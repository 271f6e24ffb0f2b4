//! Session configuration, loadable from JSON or YAML.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::LaunchConfig;
use crate::error::{Result, UiwrightError};
use crate::wait::{DEFAULT_POLL_INTERVAL, LONG, LONGER, SHORT};

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Named timeouts, in milliseconds in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Default for assertions and action waits.
    #[serde(with = "duration_ms")]
    pub short: Duration,
    /// Used after [`Flow::long_timeout`](crate::Flow::long_timeout).
    #[serde(with = "duration_ms")]
    pub long: Duration,
    /// Used after [`Flow::longer_timeout`](crate::Flow::longer_timeout).
    #[serde(with = "duration_ms")]
    pub longer: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: SHORT,
            long: LONG,
            longer: LONGER,
        }
    }
}

/// What an action does when the wait before its gesture fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionFailurePolicy {
    /// Capture a screenshot, skip the gesture and let the next assertion report.
    #[default]
    Defer,
    /// Record the failure like an assertion would.
    Fail,
}

/// When diagnostic screenshots are captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactMode {
    /// When a wait times out.
    #[default]
    OnFailure,
    /// On failures and after every screen transition.
    Always,
    /// Never.
    Off,
}

/// Where and when screenshots and the run report are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsConfig {
    /// When screenshots are captured.
    #[serde(default)]
    pub mode: ArtifactMode,
    /// Parent of the per-run directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl ArtifactsConfig {
    /// The configured directory, or `uiwright-artifacts` in the working directory.
    pub fn base_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("uiwright-artifacts"))
    }
}

/// Settings shared by every screen flow of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Assertion and action wait timeouts.
    pub timeouts: Timeouts,
    /// Delay between snapshots while waiting.
    #[serde(rename = "pollIntervalMs", with = "duration_ms")]
    pub poll_interval: Duration,
    /// Handling of a failed wait before a gesture.
    pub action_failures: ActionFailurePolicy,
    /// Long-press duration, also used as the press before a drag.
    ///
    /// Defaults to one second, not to the short timeout.
    #[serde(rename = "pressDurationMs", with = "duration_ms")]
    pub press_duration: Duration,
    /// Hold at the end of a drag when the caller gives none. Also one second
    /// by default rather than the short timeout.
    #[serde(rename = "dragHoldMs", with = "duration_ms")]
    pub drag_hold: Duration,
    /// Screenshot capture and the artifacts directory.
    pub artifacts: ArtifactsConfig,
    /// Screen the app should open on, passed in the launch environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_screen: Option<String>,
    /// Extra launch environment variables.
    pub env: HashMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            action_failures: ActionFailurePolicy::default(),
            press_duration: Duration::from_secs(1),
            drag_hold: Duration::from_secs(1),
            artifacts: ArtifactsConfig::default(),
            launch_screen: None,
            env: HashMap::new(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file. The format follows the extension; anything else is
    /// tried as JSON, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| UiwrightError::Config(format!("failed to read config file: {e}")))?;

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: Self = if ext == "json" {
            serde_json::from_str(&contents)?
        } else if ext == "yaml" || ext == "yml" {
            serde_yaml::from_str(&contents).map_err(|e| UiwrightError::Yaml(e.to_string()))?
        } else {
            serde_json::from_str(&contents)
                .or_else(|_| serde_yaml::from_str(&contents))
                .map_err(|e| UiwrightError::Config(format!("config parse error: {e}")))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the waiter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(UiwrightError::Config(
                "pollIntervalMs must be greater than zero".to_string(),
            ));
        }
        if self.timeouts.short.is_zero() {
            return Err(UiwrightError::Config(
                "timeouts.short must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the default assertion timeout.
    pub fn short_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.short = timeout;
        self
    }

    /// Set the poll interval for all waits.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the action failure policy.
    pub fn action_failures(mut self, policy: ActionFailurePolicy) -> Self {
        self.action_failures = policy;
        self
    }

    /// Set the long-press duration.
    pub fn press_duration(mut self, duration: Duration) -> Self {
        self.press_duration = duration;
        self
    }

    /// Set the artifact capture mode.
    pub fn artifacts(mut self, mode: ArtifactMode) -> Self {
        self.artifacts.mode = mode;
        self
    }

    /// Set the directory artifacts are written to.
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts.dir = Some(dir.into());
        self
    }

    /// Open the application directly on the named screen.
    pub fn launch_screen(mut self, name: impl Into<String>) -> Self {
        self.launch_screen = Some(name.into());
        self
    }

    /// Set a launch environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The launch environment described by this configuration.
    pub fn launch_config(&self) -> LaunchConfig {
        let mut launch = LaunchConfig::new();
        for (key, value) in &self.env {
            launch = launch.env(key, value);
        }
        match &self.launch_screen {
            Some(name) => launch.launch_screen(name),
            None => launch,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.timeouts.short, Duration::from_secs(10));
        assert_eq!(config.timeouts.longer, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.action_failures, ActionFailurePolicy::Defer);
        assert_eq!(config.artifacts.mode, ArtifactMode::OnFailure);
        assert_eq!(config.artifacts.base_dir(), PathBuf::from("uiwright-artifacts"));
    }

    #[test]
    fn test_press_and_hold_default_below_short_timeout() {
        let config = SessionConfig::default();
        assert_eq!(config.press_duration, Duration::from_secs(1));
        assert_eq!(config.drag_hold, Duration::from_secs(1));
        assert!(config.press_duration < config.timeouts.short);
    }

    #[test]
    fn test_load_timeout_tiers_and_artifacts_dir() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"timeouts": {{"long": 4000, "longer": 8000}}, "artifacts": {{"dir": "out"}}}}"#
        )
        .unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.timeouts.short, SHORT);
        assert_eq!(config.timeouts.long, Duration::from_secs(4));
        assert_eq!(config.timeouts.longer, Duration::from_secs(8));
        assert_eq!(config.artifacts.mode, ArtifactMode::OnFailure);
        assert_eq!(config.artifacts.base_dir(), PathBuf::from("out"));
    }

    #[test]
    fn test_load_yaml_with_partial_fields() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "timeouts:\n  short: 2500\npollIntervalMs: 50\nactionFailures: fail\nartifacts:\n  mode: \"off\"\nlaunchScreen: CapitalView"
        )
        .unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.timeouts.short, Duration::from_millis(2500));
        assert_eq!(config.timeouts.long, LONG);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.action_failures, ActionFailurePolicy::Fail);
        assert_eq!(config.artifacts.mode, ArtifactMode::Off);
        assert_eq!(
            config.launch_config().get_launch_screen(),
            Some("CapitalView")
        );
    }

    #[test]
    fn test_load_json_without_extension() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pressDurationMs": 400, "env": {{"LOCALE": "en"}}}}"#).unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.press_duration, Duration::from_millis(400));
        assert_eq!(
            config.launch_config().env.get("LOCALE").map(String::as_str),
            Some("en")
        );
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"pollIntervalMs": 0}}"#).unwrap();
        assert!(matches!(
            SessionConfig::load(file.path()),
            Err(UiwrightError::Config(_))
        ));
    }
}
