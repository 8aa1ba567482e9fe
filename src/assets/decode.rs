use std::sync::Arc;

use crate::{
    FramefitResult,
    assets::{FrameAsset, PreparedImage, PreparedSvg},
    error::FramefitError,
};

/// Decode photo bytes (any raster format the `image` crate knows) into a
/// premultiplied RGBA8 raster.
pub fn decode_image(bytes: &[u8]) -> FramefitResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FramefitError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn parse_svg(bytes: &[u8]) -> FramefitResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FramefitError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode frame bytes, routing SVG markup to the vector path and everything
/// else to the raster decoder. The frame shares the photo decode path, so a
/// manually supplied frame file behaves exactly like the fetched one.
pub fn decode_frame(bytes: &[u8]) -> FramefitResult<FrameAsset> {
    if looks_like_svg(bytes) {
        Ok(FrameAsset::Vector(parse_svg(bytes)?))
    } else {
        Ok(FrameAsset::Raster(decode_image(bytes)?))
    }
}

/// Raster formats start with a binary magic number; SVG is XML text whose
/// first non-whitespace byte is `<` (optionally behind a UTF-8 BOM).
fn looks_like_svg(bytes: &[u8]) -> bool {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'<')
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
