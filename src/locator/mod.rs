//! Polling search for a template on the live screen
//!
//! The locator keeps asking the capture backend for a match until one is
//! found or the configured timeout runs out. "Not found" and transient
//! capture errors only cost one poll; the deadline is the only way out
//! besides a match.

use crate::config::SearchConfig;
use crate::error::{MatchError, MatchResult};
use crate::screen::ScreenCapture;
use crate::template_matching::{Coordinate, MatchAttempt, ScreenRegion, Template};
use std::path::Path;
use tokio::time::{Duration, Instant};


/// A successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// Center of the region, in virtual desktop coordinates
    pub coordinate: Coordinate,
    pub region: ScreenRegion,
    pub attempts: u32,
    pub elapsed: Duration,
}

pub struct Locator<'a, S: ScreenCapture> {
    screen: &'a S,
    config: SearchConfig,
}

impl<'a, S: ScreenCapture> Locator<'a, S> {
    pub fn new(screen: &'a S, config: SearchConfig) -> Self {
        Self { screen, config }
    }

    /// Load the template at `path` and poll for it.
    ///
    /// Missing or undecodable templates fail before the first attempt.
    pub async fn locate(&self, path: &Path) -> MatchResult<Located> {
        self.config.validate()?;

        let template = match Template::load(path) {
            Ok(t) => t,
            Err(e) => {
                log::error!("{e}");
                return Err(e);
            }
        };

        self.locate_template(&template).await
    }

    /// Poll for an already loaded template
    pub async fn locate_template(&self, template: &Template) -> MatchResult<Located> {
        self.config.validate()?;

        log::info!(
            "🔍 Searching for '{}' ({}x{}) on {}",
            template.path.display(),
            template.width(),
            template.height(),
            self.screen.name()
        );
        log::info!(
            "Confidence: {}, timeout: {:?}",
            self.config.confidence,
            self.config.timeout
        );

        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.screen.locate(template, self.config.confidence).await {
                MatchAttempt::Found(region) => {
                    let coordinate = region.center().offset(self.screen.origin());
                    let elapsed = start.elapsed();
                    log::info!(
                        "✅ Found '{}' at ({}, {}) after {} attempt(s) in {:?}",
                        template.name,
                        coordinate.x,
                        coordinate.y,
                        attempts,
                        elapsed
                    );
                    log::info!("Matched region: {region}");
                    return Ok(Located {
                        coordinate,
                        region,
                        attempts,
                        elapsed,
                    });
                }
                MatchAttempt::NotFound => {
                    log::debug!("Attempt {attempts}: '{}' not on screen yet", template.name);
                }
                MatchAttempt::Error(reason) => {
                    log::warn!("Attempt {attempts}: search for '{}' failed: {reason}", template.name);
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= self.config.timeout {
                log::warn!(
                    "Timed out looking for '{}' after {} attempt(s) in {:?}",
                    template.path.display(),
                    attempts,
                    elapsed
                );
                return Err(MatchError::Timeout {
                    path: template.path.clone(),
                    attempts,
                    elapsed,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
