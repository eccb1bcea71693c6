use std::f64::consts::TAU;

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::layout::Segment;
use crate::prize::RoundResult;
use crate::spin::POINTER_ANGLE;
use crate::WheelConfig;

/// Color of a wheel element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Fixed cyclic segment palette, indexed by segment position so the same
/// slice keeps the same color across renders regardless of probability.
pub const PALETTE: [Color; 6] = [
    Color::new(0xf9, 0x73, 0x16),
    Color::new(0x06, 0xb6, 0xd4),
    Color::new(0x8b, 0x5c, 0xf6),
    Color::new(0xec, 0x48, 0x99),
    Color::new(0x22, 0xc5, 0x5e),
    Color::new(0xea, 0xb3, 0x08),
];

/// RGBA framebuffer target, 4 bytes per pixel.
pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

/// Paint the whole wheel for one frame: segment sectors at the given
/// rotation, labels on the rotated bisectors, the center hub, the fixed top
/// pointer and the last round result. Side effect only.
pub fn render_wheel(
    canvas: &mut Canvas,
    segments: &[Segment],
    rotation: f64,
    result: Option<&RoundResult>,
    font: Option<&Font<'static>>,
    config: &WheelConfig,
) {
    canvas.clear(config.background_color.as_tuple());

    let cx = canvas.width as i32 / 2;
    let cy = canvas.height as i32 / 2;
    let r = (canvas.width.min(canvas.height) as i32) / 2 - config.wheel_margin;
    if r <= 0 {
        return;
    }

    for (slot, segment) in segments.iter().enumerate() {
        let color = PALETTE[slot % PALETTE.len()];
        fill_sector(
            canvas,
            cx,
            cy,
            r,
            segment.start + rotation,
            segment.span(),
            color.as_tuple(),
        );
    }

    if let Some(font) = font {
        let scale = Scale::uniform(config.label_font_size);
        let label_radius = r as f64 * config.label_radius_factor;
        for segment in segments {
            if segment.span() < 1e-6 {
                continue;
            }
            let angle = segment.bisector() + rotation;
            let x = (cx as f64 + angle.cos() * label_radius) as i32;
            let y = (cy as f64 + angle.sin() * label_radius) as i32;
            draw_text(
                canvas,
                x,
                y,
                &segment.label,
                font,
                scale,
                config.text_color.as_tuple(),
            );
        }

        if let Some(result) = result {
            draw_text(
                canvas,
                cx,
                cy + r + config.wheel_margin / 2,
                &result.name,
                font,
                scale,
                config.text_color.as_tuple(),
            );
        }
    }

    draw_circle(
        canvas,
        cx,
        cy,
        config.hub_radius,
        config.text_color.as_tuple(),
    );

    // The pointer does not rotate with the wheel: tip just inside the rim,
    // base above it, at POINTER_ANGLE (the top of the circle).
    let tip_y = cy as f64 + POINTER_ANGLE.sin() * (r as f64 - config.pointer_length as f64);
    let base_y = cy as f64 + POINTER_ANGLE.sin() * (r as f64 + 4.0);
    fill_triangle(
        canvas,
        (cx as f64, tip_y),
        (cx as f64 - config.pointer_half_width as f64, base_y),
        (cx as f64 + config.pointer_half_width as f64, base_y),
        config.pointer_color.as_tuple(),
    );
}

pub(crate) fn set_pixel(canvas: &mut Canvas, x: usize, y: usize, color: (u8, u8, u8), alpha: f32) {
    if x < canvas.width && y < canvas.frame.len() / (canvas.width * 4) {
        let idx = (y * canvas.width + x) * 4;
        let src = [color.0 as f32, color.1 as f32, color.2 as f32, 255.0 * alpha];
        let dst = [
            canvas.frame[idx] as f32,
            canvas.frame[idx + 1] as f32,
            canvas.frame[idx + 2] as f32,
            canvas.frame[idx + 3] as f32,
        ];
        let a = src[3] / 255.0;
        let out = [
            (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
            (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
            (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
            0xff,
        ];
        canvas.frame[idx..idx + 4].copy_from_slice(&out);
    }
}

/// Fill the circular sector spanning `span` radians clockwise from
/// `start_angle`, anti-aliased at the rim. Zero or negative spans draw
/// nothing.
pub(crate) fn fill_sector(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    r: i32,
    start_angle: f64,
    span: f64,
    color: (u8, u8, u8),
) {
    if span <= 0.0 || r <= 0 {
        return;
    }
    let full_circle = span >= TAU - 1e-9;
    let start = start_angle.rem_euclid(TAU);
    let end = start + span;

    for y in (cy - r - 1).max(0)..=(cy + r + 1).min(canvas.height as i32 - 1) {
        for x in (cx - r - 1).max(0)..=(cx + r + 1).min(canvas.width as i32 - 1) {
            let dx = x - cx;
            let dy = y - cy;
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist > r as f64 + 1.0 {
                continue;
            }
            if !full_circle {
                let angle = (dy as f64).atan2(dx as f64).rem_euclid(TAU);
                let in_sector =
                    (angle >= start && angle < end) || (angle + TAU >= start && angle + TAU < end);
                if !in_sector {
                    continue;
                }
            }
            let aa = if dist > r as f64 {
                1.0 - (dist - r as f64).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                set_pixel(canvas, x as usize, y as usize, color, aa as f32);
            }
        }
    }
}

pub(crate) fn fill_triangle(
    canvas: &mut Canvas,
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    color: (u8, u8, u8),
) {
    fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
        (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
    }

    let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
    let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(canvas.width as i32 - 1);
    let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
    let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(canvas.height as i32 - 1);
    let area = edge(v0, v1, v2);
    if area.abs() < 1e-9 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f64, y as f64);
            let w0 = edge(v1, v2, p);
            let w1 = edge(v2, v0, p);
            let w2 = edge(v0, v1, p);
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                set_pixel(canvas, x as usize, y as usize, color, 1.0);
            }
        }
    }
}

pub(crate) fn draw_circle(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: (u8, u8, u8)) {
    for y in -radius..=radius {
        for x in -radius..=radius {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = if dist > radius as f64 {
                1.0 - (dist - radius as f64).min(1.0)
            } else {
                1.0
            };
            if dist <= radius as f64 + 1.0 && aa > 0.0 {
                let px = cx + x;
                let py = cy + y;
                if px >= 0 && py >= 0 {
                    set_pixel(canvas, px as usize, py as usize, color, aa as f32);
                }
            }
        }
    }
}

/// Draw text centered on (x, y).
pub(crate) fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, 0.0 + v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = x - width_px / 2;
    let offset_y = y - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                if px >= 0 && px < canvas.width as i32 && py >= 0 && py < canvas.height as i32 {
                    set_pixel(canvas, px as usize, py as usize, color, v);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::prize::Prize;

    fn buffer(width: usize, height: usize) -> Vec<u8> {
        vec![0; width * height * 4]
    }

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * width + x) * 4;
        (frame[idx], frame[idx + 1], frame[idx + 2])
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut frame = buffer(8, 8);
        let mut canvas = Canvas::new(&mut frame, 8, 8);
        canvas.clear((1, 2, 3));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(pixel(&frame, 8, x, y), (1, 2, 3));
            }
        }
    }

    #[test]
    fn sector_fill_respects_angular_bounds() {
        let mut frame = buffer(64, 64);
        let mut canvas = Canvas::new(&mut frame, 64, 64);
        canvas.clear((0, 0, 0));
        // Right half-plane sector: [-π/2, π/2).
        fill_sector(
            &mut canvas,
            32,
            32,
            20,
            -std::f64::consts::FRAC_PI_2,
            std::f64::consts::PI,
            (255, 0, 0),
        );
        assert_eq!(pixel(&frame, 64, 42, 32), (255, 0, 0), "inside, to the right");
        assert_eq!(pixel(&frame, 64, 22, 32), (0, 0, 0), "outside, to the left");
        assert_eq!(pixel(&frame, 64, 60, 32), (0, 0, 0), "beyond the radius");
    }

    #[test]
    fn zero_span_sector_draws_nothing() {
        let mut frame = buffer(32, 32);
        let mut canvas = Canvas::new(&mut frame, 32, 32);
        canvas.clear((9, 9, 9));
        fill_sector(&mut canvas, 16, 16, 10, 1.0, 0.0, (255, 255, 255));
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(pixel(&frame, 32, x, y), (9, 9, 9));
            }
        }
    }

    #[test]
    fn full_wheel_paints_first_palette_color() {
        let config = WheelConfig::builder().build();
        let segments = layout(&[Prize::new("A", 1.0)]);
        let mut frame = buffer(128, 128);
        let mut canvas = Canvas::new(&mut frame, 128, 128);
        render_wheel(&mut canvas, &segments, 0.0, None, None, &config);

        let bg = config.background_color.as_tuple();
        assert_eq!(pixel(&frame, 128, 1, 1), bg, "corner stays background");
        // Off-center, inside the disk, clear of hub and pointer.
        assert_eq!(pixel(&frame, 128, 84, 64), PALETTE[0].as_tuple());
    }

    #[test]
    fn pointer_sits_at_the_top_regardless_of_rotation() {
        let config = WheelConfig::builder().build();
        let segments = layout(&[Prize::new("A", 1.0)]);
        let pointer = config.pointer_color.as_tuple();
        for rotation in [0.0, 1.3, 4.0] {
            let mut frame = buffer(128, 128);
            let mut canvas = Canvas::new(&mut frame, 128, 128);
            render_wheel(&mut canvas, &segments, rotation, None, None, &config);
            let r = 64 - config.wheel_margin;
            let y = 64 - r + config.pointer_length / 2;
            assert_eq!(
                pixel(&frame, 128, 64, y as usize),
                pointer,
                "pointer missing at rotation {rotation}"
            );
        }
    }
}
