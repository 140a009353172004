use super::types::ScreenCapture;
use crate::config::SafetyConfig;
use crate::error::{MatchError, MatchResult};
use image::RgbaImage;
use std::sync::Mutex;
use tokio::time::{Duration, Instant};
use xcap::Monitor;

/// Primary monitor captured through `xcap`
pub struct DesktopScreen {
    name: String,
    origin: (i32, i32),
    safety: SafetyConfig,
    last_operation: Mutex<Option<Instant>>,
}

impl DesktopScreen {
    /// Resolve the primary monitor once and remember where it sits
    pub async fn connect(safety: SafetyConfig) -> MatchResult<Self> {
        let (name, origin) = tokio::task::spawn_blocking(|| -> MatchResult<_> {
            let monitor = primary_monitor()?;
            Ok((monitor.name()?, (monitor.x()?, monitor.y()?)))
        })
        .await??;

        log::debug!(
            "Using monitor '{}' at ({},{}) fail_safe={} pause={:?}",
            name,
            origin.0,
            origin.1,
            safety.fail_safe,
            safety.pause
        );

        Ok(Self {
            name,
            origin,
            safety,
            last_operation: Mutex::new(None),
        })
    }

    /// Hold back until `pause` has passed since the previous operation
    async fn throttle(&self) {
        let wait = self
            .last_operation
            .lock()
            .ok()
            .and_then(|last| *last)
            .map(|last| self.safety.pause.saturating_sub(last.elapsed()))
            .unwrap_or(Duration::ZERO);

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        if let Ok(mut last) = self.last_operation.lock() {
            *last = Some(Instant::now());
        }
    }
}

impl ScreenCapture for DesktopScreen {
    async fn dimensions(&self) -> MatchResult<(u32, u32)> {
        self.throttle().await;
        tokio::task::spawn_blocking(|| -> MatchResult<_> {
            let monitor = primary_monitor()?;
            Ok((monitor.width()?, monitor.height()?))
        })
        .await?
    }

    async fn screenshot(&self) -> MatchResult<RgbaImage> {
        self.throttle().await;
        tokio::task::spawn_blocking(|| -> MatchResult<_> {
            Ok(primary_monitor()?.capture_image()?)
        })
        .await?
    }

    fn origin(&self) -> (i32, i32) {
        self.origin
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The primary monitor, or the first one when none is flagged primary
fn primary_monitor() -> MatchResult<Monitor> {
    let monitors = Monitor::all()?;
    let primary = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);
    monitors
        .into_iter()
        .nth(primary)
        .ok_or(MatchError::NoMonitor)
}
