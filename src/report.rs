//! Pass/fail record of a session.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::error::Result;

/// Category of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// A waited-for element never appeared.
    ElementNotFound,
    /// An element was found but never reached the expected state.
    StateMismatch,
    /// The next screen's root never appeared.
    TransitionFailure,
    /// A label count did not match.
    LabelCount,
    /// The DSL was used incorrectly.
    UsageError,
    /// The device idiom has no branch.
    UnsupportedIdiom,
    /// The driver failed to take a snapshot or perform a gesture.
    DriverError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ElementNotFound => "element not found",
            FailureKind::StateMismatch => "state mismatch",
            FailureKind::TransitionFailure => "transition failure",
            FailureKind::LabelCount => "label count",
            FailureKind::UsageError => "usage error",
            FailureKind::UnsupportedIdiom => "unsupported idiom",
            FailureKind::DriverError => "driver error",
        };
        f.write_str(name)
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: FailureKind,
    /// Identity of the screen the failing chain was on.
    pub screen: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Failure {
    /// Create a failure stamped with the current time.
    pub fn new(kind: FailureKind, screen: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            screen: screen.into(),
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.screen, self.kind, self.message)
    }
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// A screenshot attached to the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    #[serde(serialize_with = "as_base64")]
    pub png: Vec<u8>,
    pub captured_at: DateTime<Local>,
}

impl Attachment {
    /// Create an attachment stamped with the current time.
    pub fn new(name: impl Into<String>, png: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            png,
            captured_at: Local::now(),
        }
    }
}

/// Failures and screenshots collected over a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub failures: Vec<Failure>,
    pub attachments: Vec<Attachment>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reported failure.
    pub fn record(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Keep a screenshot with the report.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Whether no failure was recorded.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line per failure.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize to pretty JSON, with attachments base64-encoded.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `report.json` and one PNG per attachment into a new timestamped
    /// directory under `base`. Returns the directory.
    pub fn write_artifacts(&self, base: &Path) -> Result<PathBuf> {
        let run_dir = base.join(Local::now().format("%Y%m%d-%H%M%S%.3f").to_string());
        fs::create_dir_all(&run_dir)?;

        for (index, attachment) in self.attachments.iter().enumerate() {
            let path = run_dir.join(format!("{:03}-{}.png", index + 1, file_stem(&attachment.name)));
            fs::write(path, &attachment.png)?;
        }
        fs::write(run_dir.join("report.json"), self.to_json()?)?;

        Ok(run_dir)
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if stem.is_empty() {
        "screenshot".to_string()
    } else {
        stem
    }
}
