pub mod app;
pub mod args;
pub mod config;
pub mod debug_capture;
pub mod environment;
pub mod error;
pub mod locator;
pub mod logging;
pub mod screen;
pub mod template_matching;

pub use config::{SafetyConfig, SearchConfig};
pub use error::{MatchError, MatchResult};
pub use locator::{Located, Locator};
pub use screen::{DesktopScreen, ScreenCapture};
pub use template_matching::{Coordinate, ScreenRegion};
