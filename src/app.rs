//! One lookup from start to exit code

use crate::config::SearchConfig;
use crate::debug_capture;
use crate::environment::check_environment;
use crate::locator::Locator;
use crate::screen::ScreenCapture;
use crate::template_matching::Coordinate;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// How the invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Coordinates were written to stdout
    Found(Coordinate),
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Check the environment, search for `template`, and report on `out`.
///
/// `out` receives exactly one `x,y` line on success and nothing otherwise.
/// A timeout leaves a debug screenshot in `debug_dir`.
pub async fn run<S: ScreenCapture, W: Write>(
    screen: &S,
    template: &Path,
    config: SearchConfig,
    debug_dir: &Path,
    out: &mut W,
) -> Outcome {
    if check_environment(screen).await.is_err() {
        return Outcome::Failed;
    }

    let locator = Locator::new(screen, config);
    match locator.locate(template).await {
        Ok(found) => {
            let coordinate = found.coordinate;
            if let Err(e) = writeln!(out, "{coordinate}").and_then(|_| out.flush()) {
                log::error!("Failed to write coordinates: {e}");
                return Outcome::Failed;
            }
            log::info!("Match succeeded, coordinates: ({}, {})", coordinate.x, coordinate.y);
            Outcome::Found(coordinate)
        }
        Err(e) if e.is_timeout() => {
            log::error!("Image not found: {e}");
            match debug_capture::save_debug_screenshot(screen, debug_dir, debug_capture::now())
                .await
            {
                Ok(path) => log::info!("Saved debug screenshot: {}", path.display()),
                Err(e) => log::error!("Debug screenshot failed: {e}"),
            }
            Outcome::Failed
        }
        Err(e) => {
            log::error!("Lookup aborted: {e}");
            Outcome::Failed
        }
    }
}

/// Race `lookup` against `interrupt`; an interrupt is a failure with nothing printed.
///
/// The lookup future is dropped on interrupt, so any output it had not yet
/// written never reaches stdout.
pub async fn run_until_interrupted<L, I>(lookup: L, interrupt: I) -> Outcome
where
    L: Future<Output = Outcome>,
    I: Future<Output = ()>,
{
    tokio::select! {
        outcome = lookup => outcome,
        _ = interrupt => {
            log::info!("Interrupted by user");
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::fake::FakeScreen;
    use crate::template_matching::matcher::tests::{screen_with, speckle};
    use crate::template_matching::{MatchAttempt, ScreenRegion};
    use image::DynamicImage;
    use tokio::time::Duration;

    fn debug_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("debug_") && name.ends_with(".png"))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_found_prints_single_coordinate_line() {
        let dir = tempfile::tempdir().unwrap();
        let template = speckle(40, 20, 7);
        let path = dir.path().join("ok.png");
        template.save(&path).unwrap();
        let screen = screen_with(200, 160, &template, 100, 100);
        let fake = FakeScreen::showing(DynamicImage::ImageLuma8(screen).to_rgba8());

        let mut out = Vec::new();
        let outcome = run(&fake, &path, SearchConfig::default(), dir.path(), &mut out).await;

        assert_eq!(String::from_utf8(out).unwrap(), "120,110\n");
        assert_eq!(outcome, Outcome::Found(Coordinate { x: 120, y: 110 }));
        assert!(outcome.is_success());
        assert!(debug_files(dir.path()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_template_prints_nothing_and_skips_debug_capture() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeScreen::showing(image::RgbaImage::new(32, 32));

        let mut out = Vec::new();
        let outcome = run(
            &fake,
            &dir.path().join("missing.png"),
            SearchConfig::default(),
            dir.path(),
            &mut out,
        )
        .await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.is_empty());
        assert_eq!(fake.attempts(), 0);
        assert!(debug_files(dir.path()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_saves_debug_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.png");
        speckle(8, 8, 5).save(&path).unwrap();
        let fake = FakeScreen::answering(vec![MatchAttempt::NotFound]);
        let config = SearchConfig::with_limits(0.8, Duration::from_secs(10));

        let mut out = Vec::new();
        let outcome = run(&fake, &path, config, dir.path(), &mut out).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.is_empty());
        assert_eq!(debug_files(dir.path()).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_environment_never_searches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        speckle(8, 8, 5).save(&path).unwrap();
        let fake = FakeScreen::broken();

        let mut out = Vec::new();
        let outcome = run(&fake, &path, SearchConfig::default(), dir.path(), &mut out).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(out.is_empty());
        assert_eq!(fake.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unwritable_stdout_is_a_failure() {
        struct ClosedPipe;
        impl Write for ClosedPipe {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        speckle(8, 8, 5).save(&path).unwrap();
        let fake = FakeScreen::answering(vec![MatchAttempt::Found(ScreenRegion {
            left: 0,
            top: 0,
            width: 8,
            height: 8,
            score: 1.0,
        })]);

        let outcome = run(&fake, &path, SearchConfig::default(), dir.path(), &mut ClosedPipe).await;
        assert_eq!(outcome, Outcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_mid_search_fails_silently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.png");
        speckle(8, 8, 5).save(&path).unwrap();
        let fake = FakeScreen::answering(vec![MatchAttempt::NotFound]);

        let mut out = Vec::new();
        let outcome = run_until_interrupted(
            run(&fake, &path, SearchConfig::default(), dir.path(), &mut out),
            tokio::time::sleep(Duration::from_millis(1200)),
        )
        .await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(!outcome.is_success());
        assert!(out.is_empty());
        assert!(fake.attempts() >= 1, "the search had started");
        assert!(debug_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_finished_lookup_is_not_interrupted() {
        let found = Outcome::Found(Coordinate { x: 3, y: 4 });

        let outcome =
            run_until_interrupted(async { found.clone() }, std::future::pending()).await;

        assert_eq!(outcome, found);
    }
}
