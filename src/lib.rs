//! Framefit composites a user photo into a decorative frame template.
//!
//! The pipeline is deliberately small and synchronous:
//!
//! 1. **Load**: photo bytes from disk, frame bytes from a remote URL (with a
//!    local-file fallback) — see [`assets::fetch`]
//! 2. **Decode**: bytes into premultiplied RGBA8 rasters or a parsed SVG tree
//!    — see [`assets::decode`]
//! 3. **Compose**: cover-fit the photo into the template's hole rectangle,
//!    apply user pan/zoom, hard-clip, and draw the frame on top — see
//!    [`compose::compose`]
//! 4. **Export**: the flattened [`compose::Surface`] is written out as PNG
//!
//! Composition is a pure function of its inputs: identical photo, frame, and
//! view parameters always produce byte-identical output.
#![forbid(unsafe_code)]

pub mod assets;
pub mod blend;
pub mod compose;
pub mod error;
pub mod model;
pub mod naming;

pub use assets::{FrameAsset, PreparedImage, PreparedSvg};
pub use compose::{RectF, Surface, compose, hole_rect, place_photo, resolve_frame_size};
pub use error::{FramefitError, FramefitResult};
pub use model::{HoleGeometry, TemplateConfig, ViewParams};
