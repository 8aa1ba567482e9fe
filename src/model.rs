use std::path::Path;

use anyhow::Context as _;

use crate::error::{FramefitError, FramefitResult};

/// Default remote location of the frame overlay (anonymous HTTPS GET).
pub const DEFAULT_FRAME_URL: &str =
    "https://raw.githubusercontent.com/PiotrS91/pwr-frame/main/pwr-frame.svg";

/// Default prefix for generated output filenames.
pub const DEFAULT_FILE_PREFIX: &str = "AbsolwentPWr";

/// Zoom range offered to users by the CLI. The compositor itself only
/// requires `zoom > 0`.
pub const UI_ZOOM_MIN: f64 = 0.1;
pub const UI_ZOOM_MAX: f64 = 4.0;

/// User-adjustable view parameters for the photo inside the hole.
///
/// Offsets are in output-pixel units and do not scale with zoom, so panning
/// speed is the same at every zoom level.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewParams {
    /// Photo scale relative to the exact cover fit (1.0 = cover).
    pub zoom: f64,
    /// Horizontal pan in output pixels.
    pub offset_x: f64,
    /// Vertical pan in output pixels.
    pub offset_y: f64,
}

impl Default for ViewParams {
    /// The reset state: centered cover fit, no pan.
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewParams {
    pub fn validate(&self) -> FramefitResult<()> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(FramefitError::validation("zoom must be finite and > 0"));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(FramefitError::validation("offsets must be finite"));
        }
        Ok(())
    }
}

/// Hole placement within the frame, as fractions of the frame dimensions.
///
/// `aspect_ratio` is only consulted when the frame asset reports no intrinsic
/// pixel size (vector frames); resolved output height is then derived from
/// the canonical base width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoleGeometry {
    pub hole_x: f64,
    pub hole_y: f64,
    pub hole_w: f64,
    pub hole_h: f64,
    pub aspect_ratio: f64,
}

impl Default for HoleGeometry {
    /// Measured from the stock graduation-frame artwork: the hole starts
    /// below the top banner and ends above the skyline strip.
    fn default() -> Self {
        Self {
            hole_x: 0.130,
            hole_y: 0.235,
            hole_w: 0.740,
            hole_h: 0.575,
            aspect_ratio: 1200.0 / 848.0,
        }
    }
}

impl HoleGeometry {
    pub fn validate(&self) -> FramefitResult<()> {
        for (name, v) in [
            ("hole_x", self.hole_x),
            ("hole_y", self.hole_y),
            ("hole_w", self.hole_w),
            ("hole_h", self.hole_h),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(FramefitError::validation(format!(
                    "{name} must be within [0, 1]"
                )));
            }
        }
        if self.hole_w <= 0.0 || self.hole_h <= 0.0 {
            return Err(FramefitError::validation("hole_w and hole_h must be > 0"));
        }
        if self.hole_x + self.hole_w > 1.0 {
            return Err(FramefitError::validation("hole_x + hole_w must be <= 1"));
        }
        if self.hole_y + self.hole_h > 1.0 {
            return Err(FramefitError::validation("hole_y + hole_h must be <= 1"));
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(FramefitError::validation(
                "aspect_ratio must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Frame template configuration: hole geometry plus the ambient settings the
/// CLI needs (remote frame URL, output filename prefix).
///
/// All fields have defaults, so a template JSON only needs to override what
/// differs from the stock template.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub hole: HoleGeometry,
    pub frame_url: String,
    pub file_prefix: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            hole: HoleGeometry::default(),
            frame_url: DEFAULT_FRAME_URL.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl TemplateConfig {
    /// Load and validate a template from a JSON file.
    pub fn from_path(path: &Path) -> FramefitResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read template '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            FramefitError::serde(format!("parse template '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> FramefitResult<()> {
        self.hole.validate()?;
        if self.frame_url.is_empty() {
            return Err(FramefitError::validation("frame_url must be non-empty"));
        }
        Ok(())
    }
}
