// Core screen capture types and traits
use crate::error::MatchResult;
use crate::template_matching::{MatchAttempt, Template, TemplateMatcher};
use image::RgbaImage;

// Trait defining the capture capability (desktop backend or test doubles)
#[allow(async_fn_in_trait)]
pub trait ScreenCapture {
    // Pixel size of the captured display
    async fn dimensions(&self) -> MatchResult<(u32, u32)>;

    // Full-screen RGBA capture
    async fn screenshot(&self) -> MatchResult<RgbaImage>;

    // Position of the captured display on the virtual desktop
    fn origin(&self) -> (i32, i32) {
        (0, 0)
    }

    fn name(&self) -> &str;

    // Default search: capture, then correlate
    async fn locate(&self, template: &Template, confidence: f32) -> MatchAttempt {
        capture_and_match(self, template, confidence).await
    }
}

/// Take one screenshot and correlate it on the blocking pool.
///
/// Every failure is folded into `MatchAttempt::Error` so a single bad
/// capture never ends the polling loop.
pub async fn capture_and_match<S: ScreenCapture + ?Sized>(
    screen: &S,
    template: &Template,
    confidence: f32,
) -> MatchAttempt {
    let screenshot = match screen.screenshot().await {
        Ok(img) => img,
        Err(e) => return MatchAttempt::Error(e.to_string()),
    };

    let template_image = template.image.clone();
    let search = tokio::task::spawn_blocking(move || {
        TemplateMatcher::new(confidence).find_in_screenshot(&screenshot, &template_image)
    })
    .await;

    match search {
        Ok(Ok(Some(region))) => MatchAttempt::Found(region),
        Ok(Ok(None)) => MatchAttempt::NotFound,
        Ok(Err(e)) => MatchAttempt::Error(e.to_string()),
        Err(join) => MatchAttempt::Error(join.to_string()),
    }
}
