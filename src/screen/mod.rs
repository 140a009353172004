pub mod desktop;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use desktop::DesktopScreen;
pub use types::{ScreenCapture, capture_and_match};
