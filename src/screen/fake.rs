//! Scripted capture backend for tests

use super::types::{ScreenCapture, capture_and_match};
use crate::error::{MatchError, MatchResult};
use crate::template_matching::{MatchAttempt, Template};
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::VecDeque;
use tokio::time::Instant;

/// How the fake answers `locate`
pub enum Script {
    /// Run the real matcher against a fixed screenshot
    Screen(RgbaImage),
    /// Hand out these outcomes in order, repeating the last one
    Attempts(VecDeque<MatchAttempt>),
}

pub struct FakeScreen {
    script: RefCell<Script>,
    pub broken: bool,
    pub origin: (i32, i32),
    /// Time of every `locate` call
    pub calls: RefCell<Vec<Instant>>,
}

impl FakeScreen {
    pub fn showing(screen: RgbaImage) -> Self {
        Self::with_script(Script::Screen(screen))
    }

    pub fn answering(attempts: Vec<MatchAttempt>) -> Self {
        Self::with_script(Script::Attempts(attempts.into()))
    }

    /// Every capture fails
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::answering(vec![MatchAttempt::NotFound])
        }
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: RefCell::new(script),
            broken: false,
            origin: (0, 0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ScreenCapture for FakeScreen {
    async fn dimensions(&self) -> MatchResult<(u32, u32)> {
        self.screenshot().await.map(|img| img.dimensions())
    }

    async fn screenshot(&self) -> MatchResult<RgbaImage> {
        if self.broken {
            return Err(MatchError::NoMonitor);
        }
        match &*self.script.borrow() {
            Script::Screen(img) => Ok(img.clone()),
            Script::Attempts(_) => Ok(RgbaImage::new(64, 48)),
        }
    }

    fn origin(&self) -> (i32, i32) {
        self.origin
    }

    fn name(&self) -> &str {
        "fake"
    }

    async fn locate(&self, template: &Template, confidence: f32) -> MatchAttempt {
        self.calls.borrow_mut().push(Instant::now());

        if let Script::Attempts(queue) = &mut *self.script.borrow_mut() {
            return if queue.len() > 1 {
                queue.pop_front().unwrap_or(MatchAttempt::NotFound)
            } else {
                queue.front().cloned().unwrap_or(MatchAttempt::NotFound)
            };
        }

        capture_and_match(self, template, confidence).await
    }
}
