//! Still images to a fixed-cadence slideshow timeline.
//!
//! Each decodable image becomes one slide: scaled to fit the canvas while
//! keeping its aspect ratio, centered on opaque black, and held for a fixed
//! number of frames. Encoding the timeline is the job of a `VideoEncoder`.

use std::time::Duration;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use thiserror::Error;
use tracing::{debug, warn};

use super::error::DomainError;

pub(crate) const CANVAS_WIDTH: u32 = 1280;
pub(crate) const CANVAS_HEIGHT: u32 = 720;
pub(crate) const FRAME_RATE: u32 = 10;
pub(crate) const SLIDE_DURATION: Duration = Duration::from_millis(1500);
pub(crate) const TARGET_BITRATE_KBPS: u32 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VideoProfile {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) fps: u32,
    pub(crate) slide_duration: Duration,
    pub(crate) bitrate_kbps: u32,
}

impl Default for VideoProfile {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            fps: FRAME_RATE,
            slide_duration: SLIDE_DURATION,
            bitrate_kbps: TARGET_BITRATE_KBPS,
        }
    }
}

impl VideoProfile {
    pub(crate) fn frames_per_slide(&self) -> u32 {
        let frames = (self.slide_duration.as_secs_f64() * f64::from(self.fps)).round() as u32;
        frames.max(1)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SlideshowError {
    #[error("nothing to render for this period")]
    NoContent,

    #[error("assembly produced nothing: none of {attempted} images could be decoded")]
    NothingDecoded { attempted: usize },
}

impl From<SlideshowError> for DomainError {
    fn from(err: SlideshowError) -> Self {
        match err {
            SlideshowError::NoContent => DomainError::NotFound(err.to_string()),
            SlideshowError::NothingDecoded { .. } => DomainError::Unexpected(err.to_string()),
        }
    }
}

/// Encoded image bytes plus a label used when reporting decode failures.
#[derive(Debug, Clone)]
pub(crate) struct SourceImage {
    pub(crate) label: String,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct Timeline {
    slides: Vec<RgbImage>,
    profile: VideoProfile,
}

impl Timeline {
    pub(crate) fn profile(&self) -> &VideoProfile {
        &self.profile
    }

    pub(crate) fn slides(&self) -> &[RgbImage] {
        &self.slides
    }

    pub(crate) fn total_frames(&self) -> u64 {
        self.slides.len() as u64 * u64::from(self.profile.frames_per_slide())
    }

    pub(crate) fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_frames() as f64 / f64::from(self.profile.fps))
    }

    /// Every output frame in order: each slide repeated for its hold time.
    pub(crate) fn frames(&self) -> impl Iterator<Item = &RgbImage> + '_ {
        let hold = self.profile.frames_per_slide() as usize;
        self.slides
            .iter()
            .flat_map(move |slide| std::iter::repeat_n(slide, hold))
    }
}

/// Size of an image scaled to the canvas width, or to the canvas height when
/// the width fit would overflow vertically.
pub(crate) fn fit_within(src_width: u32, src_height: u32, width: u32, height: u32) -> (u32, u32) {
    let src_width = f64::from(src_width.max(1));
    let src_height = f64::from(src_height.max(1));

    let scaled_height = (src_height * f64::from(width) / src_width).round() as u32;
    if scaled_height <= height {
        return (width, scaled_height.max(1));
    }

    let scaled_width = (src_width * f64::from(height) / src_height).round() as u32;
    (scaled_width.clamp(1, width), height)
}

/// Scales `image` into the profile's canvas and centers it on black.
pub(crate) fn letterbox(image: &DynamicImage, profile: &VideoProfile) -> RgbImage {
    let (fit_width, fit_height) =
        fit_within(image.width(), image.height(), profile.width, profile.height);
    let resized = imageops::resize(&image.to_rgba8(), fit_width, fit_height, FilterType::Triangle);

    let mut canvas = RgbaImage::from_pixel(profile.width, profile.height, Rgba([0, 0, 0, 255]));
    let x = i64::from((profile.width - fit_width) / 2);
    let y = i64::from((profile.height - fit_height) / 2);
    imageops::overlay(&mut canvas, &resized, x, y);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Decodes and letterboxes `sources` in order. Undecodable images are
/// skipped with a warning.
pub(crate) fn assemble(
    sources: &[SourceImage],
    profile: VideoProfile,
) -> Result<Timeline, SlideshowError> {
    if sources.is_empty() {
        return Err(SlideshowError::NoContent);
    }

    let slides: Vec<RgbImage> = sources
        .iter()
        .filter_map(|source| match image::load_from_memory(&source.bytes) {
            Ok(decoded) => Some(letterbox(&decoded, &profile)),
            Err(err) => {
                warn!(image = %source.label, error = %err, "skipping undecodable image");
                None
            }
        })
        .collect();

    if slides.is_empty() {
        return Err(SlideshowError::NothingDecoded {
            attempted: sources.len(),
        });
    }

    debug!(
        slides = slides.len(),
        skipped = sources.len() - slides.len(),
        "slideshow assembled"
    );

    Ok(Timeline { slides, profile })
}

#[cfg(test)]
pub(crate) fn encoded_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, color)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encoding must succeed");
    bytes
}
