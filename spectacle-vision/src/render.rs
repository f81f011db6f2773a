use std::path::Path;

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::Result;
use crate::landmark::PixelPoint;
use crate::placement::Placement;

pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Flip a camera frame horizontally so it reads like a mirror.
pub fn mirror_frame(frame: &mut RgbImage) {
    imageops::flip_horizontal_in_place(frame);
}

/// Paint filled circles at each point. Points outside the frame are clipped.
pub fn draw_markers(frame: &mut RgbImage, points: &[PixelPoint], radius: u32, color: Rgb<u8>) {
    let (w, h) = frame.dimensions();
    let r = radius as f32;
    for p in points {
        let x0 = (p.x - r).floor().max(0.0) as u32;
        let y0 = (p.y - r).floor().max(0.0) as u32;
        let x1 = ((p.x + r).ceil().max(0.0) as u32).min(w);
        let y1 = ((p.y + r).ceil().max(0.0) as u32).min(h);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - p.x;
                let dy = y as f32 + 0.5 - p.y;
                if dx * dx + dy * dy <= r * r {
                    frame.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Paints the overlay graphic onto frames according to a [`Placement`].
pub struct Compositor {
    overlay: RgbaImage,
}

impl Compositor {
    pub fn new(overlay: RgbaImage) -> Self {
        Self { overlay }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let overlay = image::open(path)?.to_rgba8();
        log::debug!(
            "loaded overlay {} ({}x{})",
            path.display(),
            overlay.width(),
            overlay.height()
        );
        Ok(Self::new(overlay))
    }

    /// Swap the overlay graphic, e.g. when a different frame style is picked.
    pub fn set_overlay(&mut self, overlay: RgbaImage) {
        self.overlay = overlay;
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    /// Height the overlay takes up at the given placement width.
    pub fn scaled_height(&self, width: f32) -> f32 {
        let (ow, oh) = self.overlay.dimensions();
        if ow == 0 {
            return 0.0;
        }
        width * oh as f32 / ow as f32
    }

    /// Alpha-blend the overlay centered on the placement, scaled to its width
    /// and rotated clockwise by `rotation_degrees`.
    pub fn composite(&self, frame: &mut RgbImage, placement: &Placement) {
        let (ow, oh) = self.overlay.dimensions();
        if !placement.visible || placement.width <= 0.0 || ow == 0 || oh == 0 {
            return;
        }

        let scale = placement.width / ow as f32;
        let height = self.scaled_height(placement.width);
        let (sin, cos) = placement.rotation_degrees.to_radians().sin_cos();

        // Axis-aligned bound of the rotated overlay.
        let reach = placement.width.hypot(height) / 2.0;
        let (fw, fh) = frame.dimensions();
        let x0 = (placement.center_x - reach).floor().max(0.0) as u32;
        let y0 = (placement.center_y - reach).floor().max(0.0) as u32;
        let x1 = ((placement.center_x + reach).ceil().max(0.0) as u32).min(fw);
        let y1 = ((placement.center_y + reach).ceil().max(0.0) as u32).min(fh);

        let half_w = ow as f32 / 2.0;
        let half_h = oh as f32 / 2.0;

        for y in y0..y1 {
            for x in x0..x1 {
                // Inverse transform: screen pixel center -> overlay coordinates
                let dx = x as f32 + 0.5 - placement.center_x;
                let dy = y as f32 + 0.5 - placement.center_y;
                let u = (dx * cos + dy * sin) / scale + half_w - 0.5;
                let v = (-dx * sin + dy * cos) / scale + half_h - 0.5;

                let src = sample_bilinear(&self.overlay, u, v);
                let alpha = src[3] / 255.0;
                if alpha <= 0.0 {
                    continue;
                }

                let dst = frame.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended = src[c] * alpha + dst[c] as f32 * (1.0 - alpha);
                    dst[c] = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

/// Bilinear sample; texels outside the image count as fully transparent so
/// edges fade out instead of smearing.
fn sample_bilinear(img: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let (w, h) = img.dimensions();
    if u <= -1.0 || v <= -1.0 || u >= w as f32 || v >= h as f32 {
        return [0.0; 4];
    }

    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;

    let texel = |x: f32, y: f32| -> [f32; 4] {
        if x < 0.0 || y < 0.0 || x >= w as f32 || y >= h as f32 {
            return [0.0; 4];
        }
        let Rgba(p) = *img.get_pixel(x as u32, y as u32);
        // Premultiply so transparent texels do not bleed their color.
        let a = p[3] as f32 / 255.0;
        [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
    };

    let p00 = texel(x0, y0);
    let p10 = texel(x0 + 1.0, y0);
    let p01 = texel(x0, y0 + 1.0);
    let p11 = texel(x0 + 1.0, y0 + 1.0);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        out[c] = p00[c] * w00 + p10[c] * w10 + p01[c] * w01 + p11[c] * w11;
    }

    // Back to straight alpha
    let a = out[3] / 255.0;
    if a > 0.0 {
        for c in out.iter_mut().take(3) {
            *c /= a;
        }
    }
    out
}
