/// Template matching implementation
///
/// Mean-subtracted normalized correlation over grayscale pixels. Large
/// templates are searched on a downscaled copy first and the candidates are
/// confirmed at full resolution.
use super::types::ScreenRegion;
use crate::error::{MatchError, MatchResult};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{MatchTemplateMethod, match_template_parallel};

/// Shortest template side left after downscaling
const MIN_COARSE_SIDE: u32 = 8;
const MAX_COARSE_FACTOR: u32 = 8;
/// Downscaling blurs detail, so coarse scores are accepted this far below the threshold
const COARSE_SLACK: f32 = 0.25;
const MAX_CANDIDATES: usize = 16;
/// Full-resolution neighbourhood searched around a hit for the exact peak
const REFINE_RADIUS: u32 = 2;
/// Per-pixel variance below which a window counts as a flat color
const MIN_VARIANCE: f64 = 1.0;

/// Finds a template in screenshots at a fixed confidence threshold
pub struct TemplateMatcher {
    confidence: f32,
}

impl TemplateMatcher {
    /// Create a matcher accepting scores at or above `confidence`
    pub fn new(confidence: f32) -> Self {
        Self { confidence }
    }

    /// Search an RGBA screenshot
    pub fn find_in_screenshot(
        &self,
        screenshot: &RgbaImage,
        template: &GrayImage,
    ) -> MatchResult<Option<ScreenRegion>> {
        let screen_gray = imageops::grayscale(screenshot);
        self.find_first(&screen_gray, template)
    }

    /// Find the first region whose score reaches the threshold
    ///
    /// # Arguments
    /// * `screen` - The image to search in (grayscale)
    /// * `template` - The image to look for (grayscale)
    ///
    /// # Returns
    /// The first matching region in row-major order, or `None`. Flat screen
    /// areas never match.
    pub fn find_first(
        &self,
        screen: &GrayImage,
        template: &GrayImage,
    ) -> MatchResult<Option<ScreenRegion>> {
        if template.width() == 0 || template.height() == 0 {
            return Err(MatchError::EmptyImage);
        }
        if template.width() > screen.width() || template.height() > screen.height() {
            return Err(MatchError::TemplateTooLarge {
                template_width: template.width(),
                template_height: template.height(),
                screen_width: screen.width(),
                screen_height: screen.height(),
            });
        }
        if TemplateStats::of(template).is_none() {
            return Err(MatchError::FlatTemplate);
        }

        let factor = coarse_factor(template);
        log::debug!(
            "  ⏳ Correlating {}x{} template over {}x{} screen (1/{} coarse pass)",
            template.width(),
            template.height(),
            screen.width(),
            screen.height(),
            factor
        );

        let hit = if factor > 1 {
            self.coarse_to_fine(screen, template, factor)
        } else {
            self.full_scan(screen, template)
        };

        Ok(hit.map(|(left, top, score)| ScreenRegion {
            left,
            top,
            width: template.width(),
            height: template.height(),
            score,
        }))
    }

    /// Every position at full resolution; small templates only
    fn full_scan(&self, screen: &GrayImage, template: &GrayImage) -> Option<(u32, u32, f32)> {
        let scores = coefficient_scores(screen, template)?;
        // enumerate_pixels walks rows top to bottom
        let (x, y, _) = scores
            .enumerate_pixels()
            .find(|(_, _, score)| score[0] >= self.confidence)?;
        best_within(&scores, x, y, REFINE_RADIUS)
    }

    fn coarse_to_fine(
        &self,
        screen: &GrayImage,
        template: &GrayImage,
        factor: u32,
    ) -> Option<(u32, u32, f32)> {
        let small_template = shrink(template, factor);
        let small_screen = shrink(screen, factor);
        if small_template.width() > small_screen.width()
            || small_template.height() > small_screen.height()
        {
            return self.full_scan(screen, template);
        }
        let Some(coarse) = coefficient_scores(&small_screen, &small_template) else {
            // Detail lost in downscaling; fall back to the exact search
            return self.full_scan(screen, template);
        };

        let floor = self.confidence - COARSE_SLACK;
        let mut candidates: Vec<(u32, u32, f32)> = coarse
            .enumerate_pixels()
            .filter(|&(x, y, score)| score[0] >= floor && is_local_peak(&coarse, x, y))
            .map(|(x, y, score)| (x, y, score[0]))
            .collect();
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));
        candidates.truncate(MAX_CANDIDATES);
        log::debug!("  🔍 {} coarse candidates", candidates.len());

        candidates
            .into_iter()
            .filter_map(|(x, y, _)| {
                self.confirm(screen, template, x * factor, y * factor, factor + REFINE_RADIUS)
            })
            .min_by_key(|&(x, y, _)| (y, x))
    }

    /// Best full-resolution position within `radius` of (`x`, `y`), if it reaches the threshold
    fn confirm(
        &self,
        screen: &GrayImage,
        template: &GrayImage,
        x: u32,
        y: u32,
        radius: u32,
    ) -> Option<(u32, u32, f32)> {
        let max_x = screen.width() - template.width();
        let max_y = screen.height() - template.height();
        let left = x.saturating_sub(radius).min(max_x);
        let top = y.saturating_sub(radius).min(max_y);
        let right = (x + radius).min(max_x);
        let bottom = (y + radius).min(max_y);

        let patch = imageops::crop_imm(
            screen,
            left,
            top,
            right - left + template.width(),
            bottom - top + template.height(),
        )
        .to_image();
        let scores = coefficient_scores(&patch, template)?;
        let (px, py, score) = best_within(&scores, 0, 0, scores.width().max(scores.height()))?;
        (score >= self.confidence).then_some((left + px, top + py, score))
    }
}

/// Sum and centered sum of squares of the template pixels
struct TemplateStats {
    sum: f64,
    spread: f64,
}

impl TemplateStats {
    /// `None` for a flat template
    fn of(template: &GrayImage) -> Option<Self> {
        let n = (template.width() as f64) * (template.height() as f64);
        let (sum, squares) = template.pixels().fold((0.0, 0.0), |(s, q), p| {
            let v = p[0] as f64;
            (s + v, q + v * v)
        });
        let spread = squares - sum * sum / n;
        (spread >= MIN_VARIANCE * n).then_some(Self { sum, spread })
    }
}

/// TM_CCOEFF_NORMED scores for every placement of `template` on `screen`.
///
/// (ΣTI − N·μT·μI) / sqrt(N·varT · N·varI), with ΣTI from imageproc's raw
/// cross-correlation and the window sums from integral images. Windows with
/// no variance score 0. `None` when the template itself is flat.
fn coefficient_scores(screen: &GrayImage, template: &GrayImage) -> Option<Image<Luma<f32>>> {
    let stats = TemplateStats::of(template)?;
    let (w, h) = template.dimensions();
    let n = (w as f64) * (h as f64);

    let cross = match_template_parallel(screen, template, MatchTemplateMethod::CrossCorrelation);
    let sums = integral_image::<_, u64>(screen);
    let squares = integral_squared_image::<_, u64>(screen);

    Some(ImageBuffer::from_fn(cross.width(), cross.height(), |x, y| {
        let (right, bottom) = (x + w - 1, y + h - 1);
        let sum = sum_image_pixels(&sums, x, y, right, bottom)[0] as f64;
        let square_sum = sum_image_pixels(&squares, x, y, right, bottom)[0] as f64;
        let spread = square_sum - sum * sum / n;
        if spread < MIN_VARIANCE * n {
            return Luma([0.0]);
        }
        let covariance = cross.get_pixel(x, y)[0] as f64 - sum * stats.sum / n;
        let score = covariance / (stats.spread * spread).sqrt();
        Luma([score.clamp(-1.0, 1.0) as f32])
    }))
}

/// Downscale factor that keeps the shorter template side at `MIN_COARSE_SIDE` or more
fn coarse_factor(template: &GrayImage) -> u32 {
    (template.width().min(template.height()) / MIN_COARSE_SIDE).clamp(1, MAX_COARSE_FACTOR)
}

fn shrink(image: &GrayImage, factor: u32) -> GrayImage {
    imageops::resize(
        image,
        (image.width() / factor).max(1),
        (image.height() / factor).max(1),
        FilterType::Triangle,
    )
}

fn is_local_peak(scores: &Image<Luma<f32>>, x: u32, y: u32) -> bool {
    let value = scores.get_pixel(x, y)[0];
    let (x0, y0) = (x.saturating_sub(1), y.saturating_sub(1));
    let x1 = (x + 1).min(scores.width() - 1);
    let y1 = (y + 1).min(scores.height() - 1);
    (y0..=y1).all(|ny| (x0..=x1).all(|nx| scores.get_pixel(nx, ny)[0] <= value))
}

/// Highest score within `radius` of (`x`, `y`); the earliest position wins ties
fn best_within(
    scores: &Image<Luma<f32>>,
    x: u32,
    y: u32,
    radius: u32,
) -> Option<(u32, u32, f32)> {
    let x1 = x.saturating_add(radius).min(scores.width().checked_sub(1)?);
    let y1 = y.saturating_add(radius).min(scores.height().checked_sub(1)?);
    let mut best: Option<(u32, u32, f32)> = None;
    for ny in y.saturating_sub(radius)..=y1 {
        for nx in x.saturating_sub(radius)..=x1 {
            let score = scores.get_pixel(nx, ny)[0];
            if best.is_none_or(|(_, _, b)| score > b) {
                best = Some((nx, ny, score));
            }
        }
    }
    best
}
