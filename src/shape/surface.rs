use glam::Vec2;
use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;

static EMPTY_SURFACE: Lazy<Surface> = Lazy::new(|| Surface::new(0, 0));

/// Software RGBA surface backing the drawable-shape cache.
///
/// A zero-size surface is the universal "nothing to draw" value; consumers
/// must tolerate it at any time (it is what unknown or not-yet-generated
/// states hand out).
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// The process-wide shared empty surface.
    pub fn shared_empty() -> &'static Surface {
        &EMPTY_SURFACE
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        self.pixels.put_pixel(x, y, color);
    }

    /// Source-over blit of `src` onto `self` with its top-left at `offset`.
    /// Pixels falling outside `self` are clipped.
    pub fn blit(&mut self, src: &Surface, offset: Vec2) {
        if src.is_empty() || self.is_empty() {
            return;
        }
        let ox = offset.x.round() as i64;
        let oy = offset.y.round() as i64;
        for sy in 0..src.height() {
            let dy = oy + sy as i64;
            if dy < 0 || dy >= self.height() as i64 {
                continue;
            }
            for sx in 0..src.width() {
                let dx = ox + sx as i64;
                if dx < 0 || dx >= self.width() as i64 {
                    continue;
                }
                let s = src.pixel(sx, sy);
                let sa = s[3] as u32;
                if sa == 0 {
                    continue;
                }
                let d = self.pixels.get_pixel_mut(dx as u32, dy as u32);
                let inv = 255 - sa;
                for channel in 0..3 {
                    d[channel] =
                        ((s[channel] as u32 * sa + d[channel] as u32 * inv) / 255) as u8;
                }
                d[3] = (sa + d[3] as u32 * inv / 255) as u8;
            }
        }
    }

    /// Per-pixel linear blend from `from` towards `to`; `t` is clamped to
    /// `[0, 1]`. The result takes `to`'s dimensions, sampling transparent
    /// black where `from` has no pixel.
    pub fn blended(from: &Surface, to: &Surface, t: f32) -> Surface {
        let t = t.clamp(0.0, 1.0);
        let mut out = Surface::new(to.width(), to.height());
        for y in 0..out.height() {
            for x in 0..out.width() {
                let a = if x < from.width() && y < from.height() {
                    from.pixel(x, y)
                } else {
                    Rgba([0, 0, 0, 0])
                };
                let b = to.pixel(x, y);
                let mut mixed = [0u8; 4];
                for channel in 0..4 {
                    let av = a[channel] as f32;
                    let bv = b[channel] as f32;
                    mixed[channel] = (av + (bv - av) * t).round().clamp(0.0, 255.0) as u8;
                }
                out.put_pixel(x, y, Rgba(mixed));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_empty_surface_has_no_extent() {
        let empty = Surface::shared_empty();
        assert!(empty.is_empty());
        assert_eq!(empty.width(), 0);
    }

    #[test]
    fn blit_respects_alpha_and_clipping() {
        let mut dst = Surface::new(4, 4);
        dst.fill(Rgba([0, 0, 0, 255]));
        let mut src = Surface::new(2, 2);
        src.fill(Rgba([255, 255, 255, 255]));

        dst.blit(&src, Vec2::new(3.0, 3.0));
        assert_eq!(dst.pixel(3, 3), Rgba([255, 255, 255, 255]));
        assert_eq!(dst.pixel(2, 2), Rgba([0, 0, 0, 255]));

        let mut translucent = Surface::new(1, 1);
        translucent.fill(Rgba([255, 255, 255, 128]));
        dst.blit(&translucent, Vec2::new(0.0, 0.0));
        let blended = dst.pixel(0, 0);
        assert!(blended[0] > 100 && blended[0] < 150);
        assert_eq!(blended[3], 255);
    }

    #[test]
    fn blend_midpoint_mixes_channels() {
        let mut from = Surface::new(1, 1);
        from.fill(Rgba([0, 0, 0, 255]));
        let mut to = Surface::new(1, 1);
        to.fill(Rgba([200, 100, 50, 255]));

        let mid = Surface::blended(&from, &to, 0.5);
        assert_eq!(mid.pixel(0, 0), Rgba([100, 50, 25, 255]));

        let done = Surface::blended(&from, &to, 1.0);
        assert_eq!(done.pixel(0, 0), to.pixel(0, 0));
    }

    #[test]
    fn blend_takes_target_dimensions() {
        let from = Surface::new(1, 1);
        let to = Surface::new(3, 2);
        let out = Surface::blended(&from, &to, 0.25);
        assert_eq!((out.width(), out.height()), (3, 2));
    }
}
