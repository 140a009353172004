//! Startup check that the capture backend actually works

use crate::error::MatchResult;
use crate::screen::ScreenCapture;

/// Version string baked in by build.rs
pub const VERSION_DISPLAY: &str = env!("APP_VERSION_DISPLAY");

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReport {
    pub screen_width: u32,
    pub screen_height: u32,
    pub screenshot_width: u32,
    pub screenshot_height: u32,
}

/// Query the screen size and take one throwaway screenshot.
///
/// Any failure comes back as `MatchError::Environment`.
pub async fn check_environment<S: ScreenCapture>(screen: &S) -> MatchResult<EnvironmentReport> {
    let result = inspect(screen).await.map_err(|e| e.into_environment());
    if let Err(e) = &result {
        log::error!("Environment check failed: {e}");
    }
    result
}

async fn inspect<S: ScreenCapture>(screen: &S) -> MatchResult<EnvironmentReport> {
    let (screen_width, screen_height) = screen.dimensions().await?;
    log::info!("Screen resolution: {screen_width}x{screen_height}");
    log::info!("image-matcher version: {VERSION_DISPLAY}");

    let shot = screen.screenshot().await?;
    log::info!(
        "Test screenshot succeeded, size: {}x{}",
        shot.width(),
        shot.height()
    );

    Ok(EnvironmentReport {
        screen_width,
        screen_height,
        screenshot_width: shot.width(),
        screenshot_height: shot.height(),
    })
}
