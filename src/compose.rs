//! The compositor: cover-fit a photo into the template's hole rectangle,
//! apply user pan/zoom, hard-clip to the hole, then draw the frame on top.
//!
//! `compose` is a pure function of its inputs. Geometry stays in `f64`
//! output-pixel space until rasterization; a pixel is painted when its center
//! falls inside both the clip rectangle and the placed photo rectangle.

use crate::{
    assets::{FrameAsset, PreparedImage, PreparedSvg},
    blend,
    error::{FramefitError, FramefitResult},
    model::{HoleGeometry, ViewParams},
};

/// Canonical output width used when the frame has no intrinsic pixel size.
pub const BASE_FRAME_WIDTH: f64 = 2000.0;

/// Upper bound on either resolved output dimension.
const MAX_DIM: u32 = 16_384;

/// Flattened output raster in premultiplied RGBA8.
///
/// Alpha is 255 everywhere because composition starts from an opaque white
/// background, so the bytes can be written out as straight RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Surface {
    fn filled(width: u32, height: u32, px: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Pixel at `(x, y)`; panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// Axis-aligned rectangle in output-pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Resolve the output dimensions for a frame asset.
///
/// Intrinsic pixel size wins when the asset has one; otherwise the canonical
/// base width applies and height derives from the template aspect ratio.
pub fn resolve_frame_size(frame: &FrameAsset, geom: &HoleGeometry) -> FramefitResult<(u32, u32)> {
    let (w, h) = match frame.intrinsic_size() {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => {
            let h = (BASE_FRAME_WIDTH / geom.aspect_ratio).round().max(1.0);
            (BASE_FRAME_WIDTH as u32, h as u32)
        }
    };
    if w > MAX_DIM || h > MAX_DIM {
        return Err(FramefitError::render(format!(
            "resolved frame size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Absolute hole rectangle for a resolved frame size.
pub fn hole_rect(geom: &HoleGeometry, frame_w: u32, frame_h: u32) -> RectF {
    RectF {
        x: geom.hole_x * f64::from(frame_w),
        y: geom.hole_y * f64::from(frame_h),
        w: geom.hole_w * f64::from(frame_w),
        h: geom.hole_h * f64::from(frame_h),
    }
}

/// Cover-fit placement of the photo inside the hole.
///
/// The scaled photo fully covers the hole at `zoom = 1`; the dimension that
/// would letterbox is the one that gets scaled up. The result is centered in
/// the hole, then shifted by the user offsets (which do not scale with zoom).
pub fn place_photo(
    photo_w: u32,
    photo_h: u32,
    hole: RectF,
    view: ViewParams,
) -> FramefitResult<RectF> {
    if photo_w == 0 || photo_h == 0 {
        return Err(FramefitError::validation("photo dimensions must be > 0"));
    }
    let img_ratio = f64::from(photo_w) / f64::from(photo_h);
    let hole_ratio = hole.w / hole.h;

    let (draw_w, draw_h) = if img_ratio > hole_ratio {
        // photo proportionally wider than the hole: height constrains
        let h = hole.h * view.zoom;
        (h * img_ratio, h)
    } else {
        let w = hole.w * view.zoom;
        (w, w / img_ratio)
    };

    Ok(RectF {
        x: hole.x + (hole.w - draw_w) / 2.0 + view.offset_x,
        y: hole.y + (hole.h - draw_h) / 2.0 + view.offset_y,
        w: draw_w,
        h: draw_h,
    })
}

/// Composite `photo` into `frame` under `view`, returning the flattened
/// surface. Recomputes everything from scratch on every call.
#[tracing::instrument(skip(photo, frame, view, geom), fields(photo_w = photo.width, photo_h = photo.height))]
pub fn compose(
    photo: &PreparedImage,
    frame: &FrameAsset,
    view: ViewParams,
    geom: &HoleGeometry,
) -> FramefitResult<Surface> {
    view.validate()?;
    geom.validate()?;

    let (frame_w, frame_h) = resolve_frame_size(frame, geom)?;
    let hole = hole_rect(geom, frame_w, frame_h);

    let mut out = Surface::filled(frame_w, frame_h, [255, 255, 255, 255]);

    let placed = place_photo(photo.width, photo.height, hole, view)?;
    draw_image_clipped(&mut out, photo, placed, hole);

    let full = RectF {
        x: 0.0,
        y: 0.0,
        w: f64::from(frame_w),
        h: f64::from(frame_h),
    };
    match frame {
        FrameAsset::Raster(img) => draw_image_clipped(&mut out, img, full, full),
        FrameAsset::Vector(svg) => {
            let layer = rasterize_svg(svg, frame_w, frame_h)?;
            blend::over_in_place(&mut out.data, &layer)?;
        }
    }

    Ok(out)
}

/// Draw `src` scaled into `place`, source-over, painting only pixels whose
/// centers lie inside `clip` (hard clip, no feathering).
fn draw_image_clipped(dst: &mut Surface, src: &PreparedImage, place: RectF, clip: RectF) {
    if src.width == 0 || src.height == 0 || place.w <= 0.0 || place.h <= 0.0 {
        return;
    }
    let lo_x = clip.x.max(place.x).max(0.0);
    let hi_x = (clip.x + clip.w)
        .min(place.x + place.w)
        .min(f64::from(dst.width));
    let lo_y = clip.y.max(place.y).max(0.0);
    let hi_y = (clip.y + clip.h)
        .min(place.y + place.h)
        .min(f64::from(dst.height));
    if hi_x <= lo_x || hi_y <= lo_y {
        return;
    }

    let x_start = (lo_x - 0.5).ceil().max(0.0) as u32;
    let x_end = (hi_x - 0.5).ceil().max(0.0) as u32;
    let y_start = (lo_y - 0.5).ceil().max(0.0) as u32;
    let y_end = (hi_y - 0.5).ceil().max(0.0) as u32;

    for y in y_start..y_end {
        let v = ((f64::from(y) + 0.5 - place.y) / place.h) * f64::from(src.height) - 0.5;
        for x in x_start..x_end {
            let u = ((f64::from(x) + 0.5 - place.x) / place.w) * f64::from(src.width) - 0.5;
            let s = sample_bilinear(src, u, v);
            let idx = (y as usize * dst.width as usize + x as usize) * 4;
            let d = [
                dst.data[idx],
                dst.data[idx + 1],
                dst.data[idx + 2],
                dst.data[idx + 3],
            ];
            let o = blend::over(d, s);
            dst.data[idx..idx + 4].copy_from_slice(&o);
        }
    }
}

/// Bilinear sample in premultiplied space, with edges clamped.
fn sample_bilinear(src: &PreparedImage, u: f64, v: f64) -> [u8; 4] {
    let max_x = f64::from(src.width - 1);
    let max_y = f64::from(src.height - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(src.width - 1);
    let y1 = (y0 + 1).min(src.height - 1);
    let fx = u - f64::from(x0);
    let fy = v - f64::from(y0);

    let px = |x: u32, y: u32| -> [f64; 4] {
        let idx = (y as usize * src.width as usize + x as usize) * 4;
        let p = &src.rgba8_premul[idx..idx + 4];
        [
            f64::from(p[0]),
            f64::from(p[1]),
            f64::from(p[2]),
            f64::from(p[3]),
        ]
    };

    let p00 = px(x0, y0);
    let p10 = px(x1, y0);
    let p01 = px(x0, y1);
    let p11 = px(x1, y1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] + (p10[i] - p00[i]) * fx;
        let bot = p01[i] + (p11[i] - p01[i]) * fx;
        let val = top + (bot - top) * fy;
        out[i] = val.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Rasterize a vector frame to exactly the resolved output size (stretch
/// fill, matching how raster frames are drawn).
fn rasterize_svg(svg: &PreparedSvg, width: u32, height: u32) -> FramefitResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FramefitError::render("failed to allocate svg pixmap"))?;

    let size = svg.tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(FramefitError::render("svg has invalid width/height"));
    }
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&svg.tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::HoleGeometry;

    fn solid_photo(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for _ in 0..(w * h) {
            data.extend_from_slice(&px);
        }
        PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(data),
        }
    }

    fn graduation_hole() -> HoleGeometry {
        HoleGeometry {
            hole_x: 0.13,
            hole_y: 0.235,
            hole_w: 0.74,
            hole_h: 0.575,
            aspect_ratio: 1200.0 / 848.0,
        }
    }

    #[test]
    fn hole_rect_scales_with_frame_size() {
        let hole = hole_rect(&graduation_hole(), 2000, 1412);
        assert!((hole.x - 260.0).abs() < 1e-9);
        assert!((hole.y - 331.82).abs() < 1e-9);
        assert!((hole.w - 1480.0).abs() < 1e-9);
        assert!((hole.h - 811.9).abs() < 1e-9);
    }

    #[test]
    fn placement_width_constrained_photo() {
        // 800x600 photo into the 1480x811.9 hole: img ratio 1.333 is below
        // the hole ratio 1.823, so width constrains the cover fit.
        let hole = hole_rect(&graduation_hole(), 2000, 1412);
        let placed = place_photo(800, 600, hole, ViewParams::default()).unwrap();
        assert!((placed.w - 1480.0).abs() < 1e-9);
        assert!((placed.h - 1110.0).abs() < 1e-9);
        assert!((placed.x - 260.0).abs() < 1e-9);
        assert!((placed.y - (331.82 - 149.05)).abs() < 1e-9);
    }

    #[test]
    fn placement_height_constrained_photo() {
        // A panorama is proportionally wider than the hole: height constrains.
        let hole = RectF {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
        };
        let placed = place_photo(400, 100, hole, ViewParams::default()).unwrap();
        assert!((placed.h - 100.0).abs() < 1e-9);
        assert!((placed.w - 400.0).abs() < 1e-9);
    }

    #[test]
    fn placement_offsets_are_zoom_independent() {
        let hole = RectF {
            x: 100.0,
            y: 100.0,
            w: 200.0,
            h: 200.0,
        };
        for zoom in [0.5, 1.0, 3.0] {
            let base = place_photo(
                100,
                100,
                hole,
                ViewParams {
                    zoom,
                    offset_x: 0.0,
                    offset_y: 0.0,
                },
            )
            .unwrap();
            let panned = place_photo(
                100,
                100,
                hole,
                ViewParams {
                    zoom,
                    offset_x: 100.0,
                    offset_y: -50.0,
                },
            )
            .unwrap();
            assert_eq!(panned.x - base.x, 100.0);
            assert_eq!(panned.y - base.y, -50.0);
            assert_eq!(panned.w, base.w);
            assert_eq!(panned.h, base.h);
        }
    }

    #[test]
    fn resolve_uses_intrinsic_raster_size() {
        let frame = FrameAsset::Raster(solid_photo(640, 480, [0, 0, 0, 0]));
        assert_eq!(
            resolve_frame_size(&frame, &graduation_hole()).unwrap(),
            (640, 480)
        );
    }

    #[test]
    fn resolve_falls_back_to_base_width_for_vector() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1200 848"></svg>"#;
        let frame = crate::assets::decode::decode_frame(svg).unwrap();
        let (w, h) = resolve_frame_size(&frame, &graduation_hole()).unwrap();
        assert_eq!(w, 2000);
        let expected = 2000.0 / (1200.0 / 848.0);
        assert!((f64::from(h) - expected).abs() <= 0.5);
    }

    #[test]
    fn resolve_rejects_oversized_frames() {
        let geom = HoleGeometry {
            aspect_ratio: 0.01, // 2000 wide -> 200000 tall
            ..graduation_hole()
        };
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"></svg>"#;
        let frame = crate::assets::decode::decode_frame(svg).unwrap();
        assert!(matches!(
            resolve_frame_size(&frame, &geom),
            Err(FramefitError::Render(_))
        ));
    }

    #[test]
    fn compose_rejects_nonpositive_zoom() {
        let photo = solid_photo(4, 4, [255, 0, 0, 255]);
        let frame = FrameAsset::Raster(solid_photo(8, 8, [0, 0, 0, 0]));
        let view = ViewParams {
            zoom: 0.0,
            ..ViewParams::default()
        };
        assert!(matches!(
            compose(&photo, &frame, view, &graduation_hole()),
            Err(FramefitError::Validation(_))
        ));
    }

    #[test]
    fn compose_rejects_empty_photo() {
        let photo = PreparedImage {
            width: 0,
            height: 0,
            rgba8_premul: Arc::new(Vec::new()),
        };
        let frame = FrameAsset::Raster(solid_photo(8, 8, [0, 0, 0, 0]));
        assert!(
            compose(&photo, &frame, ViewParams::default(), &graduation_hole()).is_err()
        );
    }

    #[test]
    fn photo_is_hard_clipped_to_the_hole() {
        // 400x400 frame, hole (100,100)-(300,300). Transparent frame so only
        // the photo layer shows.
        let geom = HoleGeometry {
            hole_x: 0.25,
            hole_y: 0.25,
            hole_w: 0.5,
            hole_h: 0.5,
            aspect_ratio: 1.0,
        };
        let photo = solid_photo(100, 100, [0, 0, 255, 255]);
        let frame = FrameAsset::Raster(solid_photo(400, 400, [0, 0, 0, 0]));
        let out = compose(
            &photo,
            &frame,
            ViewParams {
                zoom: 3.0,
                ..ViewParams::default()
            },
            &geom,
        )
        .unwrap();

        // zoomed photo extends well past the hole; outside stays white
        assert_eq!(out.pixel(99, 200), [255, 255, 255, 255]);
        assert_eq!(out.pixel(300, 200), [255, 255, 255, 255]);
        assert_eq!(out.pixel(200, 99), [255, 255, 255, 255]);
        // inside the hole the photo shows
        assert_eq!(out.pixel(101, 101), [0, 0, 255, 255]);
        assert_eq!(out.pixel(299, 299), [0, 0, 255, 255]);
    }

    #[test]
    fn raster_frame_draws_over_the_photo() {
        let geom = HoleGeometry {
            hole_x: 0.25,
            hole_y: 0.25,
            hole_w: 0.5,
            hole_h: 0.5,
            aspect_ratio: 1.0,
        };
        let photo = solid_photo(100, 100, [0, 0, 255, 255]);
        let frame = FrameAsset::Raster(solid_photo(400, 400, [0, 128, 0, 255]));
        let out = compose(&photo, &frame, ViewParams::default(), &geom).unwrap();
        // opaque frame covers everything, including the hole
        assert_eq!(out.pixel(200, 200), [0, 128, 0, 255]);
        assert_eq!(out.pixel(0, 0), [0, 128, 0, 255]);
    }
}
