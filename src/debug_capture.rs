//! Diagnostic screenshot written when a search times out

use crate::error::MatchResult;
use crate::screen::ScreenCapture;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// `debug_YYYYMMDD_HHMMSS.png`
pub fn debug_file_name(at: OffsetDateTime) -> String {
    format!(
        "debug_{:04}{:02}{:02}_{:02}{:02}{:02}.png",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Local wall clock, UTC when the local offset is unknown
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Capture the full screen into `dir` and return the written path
pub async fn save_debug_screenshot<S: ScreenCapture>(
    screen: &S,
    dir: &Path,
    at: OffsetDateTime,
) -> MatchResult<PathBuf> {
    let shot = screen.screenshot().await?;
    let path = dir.join(debug_file_name(at));
    shot.save(&path)?;
    log::info!("Debug screenshot saved: {}", path.display());
    Ok(path)
}
