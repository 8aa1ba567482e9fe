pub mod decode;
pub mod fetch;

use std::sync::Arc;

/// Decoded raster, ready to draw.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parsed vector frame.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    pub tree: Arc<usvg::Tree>,
}

/// A frame overlay asset: either an ordinary raster or a vector graphic.
#[derive(Clone, Debug)]
pub enum FrameAsset {
    Raster(PreparedImage),
    Vector(PreparedSvg),
}

impl FrameAsset {
    /// Intrinsic pixel size of the asset.
    ///
    /// Vector frames are resolution-independent and report `None`; the
    /// compositor then resolves the output size from the canonical base
    /// width and the template's aspect ratio.
    pub fn intrinsic_size(&self) -> Option<(u32, u32)> {
        match self {
            FrameAsset::Raster(img) => Some((img.width, img.height)),
            FrameAsset::Vector(_) => None,
        }
    }
}
