//! A running application together with its configuration and report.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ArtifactMode, SessionConfig};
use crate::driver::{Driver, Gesture, Idiom};
use crate::error::{Result, UiwrightError};
use crate::output::Screenshot;
use crate::query::{ElementQuery, ResolvedElement, resolve};
use crate::report::{Attachment, Failure, Report};
use crate::screen::{Flow, ScreenSpec};
use crate::tree::Node;
use crate::wait::{Predicate, Waiter};

/// Why a screenshot is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptureReason {
    /// A wait timed out.
    Failure,
    /// A screen transition completed.
    Transition,
}

struct SessionInner {
    driver: Arc<dyn Driver>,
    config: SessionConfig,
    report: Mutex<Report>,
}

/// Handle to one automation session.
///
/// Cloning is cheap; clones share the driver and the report.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Launch the application and start a session.
    ///
    /// The launch environment carries `config.env` and, when set, the launch
    /// screen the application should open on.
    pub async fn launch(driver: Arc<dyn Driver>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let launch = config.launch_config();
        info!(screen = ?launch.get_launch_screen(), "launching application");
        driver.launch(&launch).await?;
        Ok(Self::attach(driver, config))
    }

    /// Start a session against an application that is already running.
    pub fn attach(driver: Arc<dyn Driver>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                driver,
                config,
                report: Mutex::new(Report::new()),
            }),
        }
    }

    /// The driver behind this session.
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.inner.driver
    }

    /// Settings this session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Device idiom of the running application.
    pub fn idiom(&self) -> Idiom {
        self.inner.driver.idiom()
    }

    /// Capture the current accessibility tree.
    pub async fn snapshot(&self) -> Result<Node> {
        self.inner.driver.snapshot().await
    }

    /// Resolve a query against a fresh snapshot.
    pub async fn resolve(&self, query: &ElementQuery) -> Result<Option<ResolvedElement>> {
        let tree = self.snapshot().await?;
        Ok(resolve(query, &tree))
    }

    /// Perform a gesture.
    pub async fn perform(&self, gesture: Gesture) -> Result<()> {
        debug!(%gesture, "performing gesture");
        self.inner.driver.perform(gesture).await
    }

    /// Wait for an element, using the session's default timing.
    pub fn wait_for(&self, query: ElementQuery, predicate: Predicate) -> Waiter<'_> {
        Waiter::new(self, query, predicate)
    }

    /// Start a flow on screen `S`.
    pub fn screen<S: ScreenSpec>(&self) -> Flow<S> {
        Flow::new(self.clone())
    }

    /// Record a failure in the report.
    pub async fn record(&self, failure: Failure) {
        warn!(screen = %failure.screen, kind = %failure.kind, "{}", failure.message);
        self.inner.report.lock().await.record(failure);
    }

    /// Failures recorded so far.
    pub async fn failures(&self) -> Vec<Failure> {
        self.inner.report.lock().await.failures.clone()
    }

    /// Copy of the report as it stands.
    pub async fn report(&self) -> Report {
        self.inner.report.lock().await.clone()
    }

    /// Fail when any failure was recorded.
    pub async fn verify(&self) -> Result<()> {
        let report = self.inner.report.lock().await;
        if report.passed() {
            return Ok(());
        }
        Err(UiwrightError::AssertionsFailed {
            count: report.failures.len(),
            summary: report.summary(),
        })
    }

    /// Take a screenshot and attach it to the report.
    ///
    /// Uses the driver's own capture when it has one, otherwise renders a
    /// wireframe of the current snapshot.
    pub async fn capture(&self, label: &str) -> Result<Attachment> {
        let png = match self.inner.driver.screenshot().await? {
            Some(png) => png,
            None => Screenshot::new(self.snapshot().await?).to_png()?,
        };
        let attachment = Attachment::new(label, png);
        self.inner.report.lock().await.attach(attachment.clone());
        debug!(label, "captured screenshot");
        Ok(attachment)
    }

    /// Capture when the artifact mode asks for it. Errors are logged only.
    pub(crate) async fn capture_on(&self, reason: CaptureReason, label: &str) {
        let wanted = match (self.inner.config.artifacts.mode, reason) {
            (ArtifactMode::Off, _) => false,
            (ArtifactMode::OnFailure, CaptureReason::Transition) => false,
            (ArtifactMode::OnFailure, CaptureReason::Failure) | (ArtifactMode::Always, _) => true,
        };
        if !wanted {
            return;
        }
        if let Err(e) = self.capture(label).await {
            warn!(error = %e, label, "screenshot capture failed");
        }
    }

    /// Write the report and its screenshots under the configured artifacts
    /// directory.
    pub async fn write_artifacts(&self) -> Result<PathBuf> {
        let base = self.inner.config.artifacts.base_dir();
        let dir = self.inner.report.lock().await.write_artifacts(&base)?;
        info!(dir = %dir.display(), "wrote artifacts");
        Ok(dir)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .field("idiom", &self.inner.driver.idiom())
            .finish()
    }
}
