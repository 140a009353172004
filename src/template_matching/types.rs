/// Template matching data types
use crate::error::{MatchError, MatchResult};
use image::GrayImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reference image to look for on screen
#[derive(Clone, Debug)]
pub struct Template {
    /// Path the template was loaded from
    pub path: PathBuf,
    /// File stem, used in log lines
    pub name: String,
    /// Grayscale pixels, shared with blocking match tasks
    pub image: Arc<GrayImage>,
}

impl Template {
    /// Load a template from disk.
    ///
    /// A missing file and an undecodable file are reported as different errors
    /// so the caller can tell them apart in the log.
    pub fn load(path: &Path) -> MatchResult<Self> {
        if !path.exists() {
            return Err(MatchError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }

        let image = image::open(path).map_err(|source| MatchError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_image(path, image.to_luma8()))
    }

    /// Wrap already decoded pixels
    pub fn from_image(path: &Path, image: GrayImage) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self {
            path: path.to_path_buf(),
            name,
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Rectangle in screen pixel space where a template matched
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// Correlation score (0.0-1.0)
    pub score: f32,
}

impl ScreenRegion {
    /// Center of the region, rounded down
    pub fn center(&self) -> Coordinate {
        Coordinate {
            x: (self.left + self.width / 2) as i32,
            y: (self.top + self.height / 2) as i32,
        }
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{},{}] score={:.3}",
            self.left, self.top, self.width, self.height, self.score
        )
    }
}

/// Integer screen position handed back to the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    /// Shift by the position of the captured display on the virtual desktop
    pub fn offset(self, origin: (i32, i32)) -> Self {
        Self {
            x: self.x + origin.0,
            y: self.y + origin.1,
        }
    }
}

/// The `x,y` form read by the calling process
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Outcome of a single search over the screen
#[derive(Clone, Debug, PartialEq)]
pub enum MatchAttempt {
    Found(ScreenRegion),
    /// Nothing scored above the threshold; expected while waiting
    NotFound,
    /// The attempt itself failed; the next poll may succeed
    Error(String),
}
