/// Template matching module for locating a reference image in screenshots
///
/// This module provides:
/// - Template loading with distinct missing/unreadable errors
/// - Correlation-based first-match search with a configurable threshold
/// - Region and coordinate types reported back to the caller
pub mod matcher;
pub mod types;

pub use matcher::TemplateMatcher;
pub use types::{Coordinate, MatchAttempt, ScreenRegion, Template};
