//! Primitive rendering functions.
//!
//! Implements rasterization algorithms for the shapes a skeleton frame needs:
//! lines (plain, anti-aliased and thick) and filled circles.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Line, Point};

/// Trait for drawable primitives.
pub trait Drawable {
    /// Draw this primitive to a framebuffer.
    fn draw(&self, fb: &mut Framebuffer, color: Rgba);

    /// Draw this primitive with anti-aliasing if supported.
    fn draw_aa(&self, fb: &mut Framebuffer, color: Rgba) {
        self.draw(fb, color);
    }
}

// ============================================================================
// Line Drawing
// ============================================================================

/// Clip a segment to the rectangle spanned by `min` and `max` (Liang-Barsky).
///
/// Returns `None` when no part of the segment lies inside or an endpoint is
/// not finite. A segment already inside is returned unchanged.
#[must_use]
pub fn clip_segment(start: Point, end: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    if !(start.is_finite() && end.is_finite()) {
        return None;
    }

    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let dx = f64::from(end.x) - x0;
    let dy = f64::from(end.y) - y0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let edges = [
        (-dx, x0 - f64::from(min.x)),
        (dx, f64::from(max.x) - x0),
        (-dy, y0 - f64::from(min.y)),
        (dy, f64::from(max.y) - y0),
    ];
    for (p, q) in edges {
        if p.abs() < f64::EPSILON {
            // Parallel to this edge: inside or nothing
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        if t <= 0.0 {
            start
        } else if t >= 1.0 {
            end
        } else {
            Point::new((x0 + t * dx) as f32, (y0 + t * dy) as f32)
        }
    };
    Some((at(t0), at(t1)))
}

/// Clip a segment to the framebuffer grown by `margin` pixels on every side.
fn clip_to_fb(fb: &Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, margin: f32) -> Option<(Point, Point)> {
    clip_segment(
        Point::new(x0, y0),
        Point::new(x1, y1),
        Point::new(-margin, -margin),
        Point::new(fb.width() as f32 - 1.0 + margin, fb.height() as f32 - 1.0 + margin),
    )
}

/// Integer endpoints of the part of a line within `margin` pixels of the framebuffer.
fn clip_pixels(fb: &Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, margin: i32) -> Option<[i64; 4]> {
    let (a, b) = clip_to_fb(fb, x0 as f32, y0 as f32, x1 as f32, y1 as f32, margin as f32)?;
    let round = |v: f32| v.round() as i64;
    Some([round(a.x), round(a.y), round(b.x), round(b.y)])
}

/// Walk the pixels of a Bresenham line, calling `plot` for each.
fn bresenham([x0, y0, x1, y1]: [i64; 4], mut plot: impl FnMut(i64, i64)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        plot(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a line using Bresenham's algorithm (non-antialiased).
///
/// The line is clipped to the framebuffer first, so far-away endpoints cost
/// no more than visible ones.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let Some(ends) = clip_pixels(fb, x0, y0, x1, y1, 1) else {
        return;
    };
    let (w, h) = (i64::from(fb.width()), i64::from(fb.height()));
    bresenham(ends, |x, y| {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            fb.set_pixel(x as u32, y as u32, color);
        }
    });
}

/// Draw a line `width` pixels wide by stamping discs along its Bresenham path.
pub fn draw_thick_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, width: f32, color: Rgba) {
    let radius = ((width - 1.0) / 2.0).round().clamp(0.0, f32::from(u16::MAX)) as i32;
    if radius == 0 {
        draw_line(fb, x0, y0, x1, y1, color);
        return;
    }
    let Some(ends) = clip_pixels(fb, x0, y0, x1, y1, radius + 1) else {
        return;
    };
    bresenham(ends, |x, y| fill_disc(fb, x, y, i64::from(radius), color));
}

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Wu's algorithm draws two pixels at each step along the major axis,
/// adjusting their intensities based on the fractional distance from
/// the ideal line position.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let Some((a, b)) = clip_to_fb(fb, x0, y0, x1, y1, 2.0) else {
        return;
    };
    let (x0, y0, x1, y1) = (a.x, a.y, b.x, b.y);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { dy / dx };

    // Swap back to canvas coordinates when plotting a steep line
    let mut put = |major: i32, minor: i32, intensity: f32| {
        if steep {
            plot(fb, minor, major, color, intensity);
        } else {
            plot(fb, major, minor, color, intensity);
        }
    };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;
    put(xpxl1, ypxl1, rfpart(yend) * xgap);
    put(xpxl1, ypxl1 + 1, fpart(yend) * xgap);

    let mut intery = yend + gradient;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;
    put(xpxl2, ypxl2, rfpart(yend) * xgap);
    put(xpxl2, ypxl2 + 1, fpart(yend) * xgap);

    for x in (xpxl1 + 1)..xpxl2 {
        let ipart = intery.floor() as i32;
        put(x, ipart, rfpart(intery));
        put(x, ipart + 1, fpart(intery));
        intery += gradient;
    }
}

/// Plot a pixel with intensity (for anti-aliased drawing).
#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 && x < fb.width() as i32 && y < fb.height() as i32 {
        let alpha = (f32::from(color.a) * intensity.clamp(0.0, 1.0)) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

impl Drawable for Line {
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_line(
            fb,
            self.start.x.round() as i32,
            self.start.y.round() as i32,
            self.end.x.round() as i32,
            self.end.y.round() as i32,
            color,
        );
    }

    fn draw_aa(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_line_aa(fb, self.start.x, self.start.y, self.end.x, self.end.y, color);
    }
}

// ============================================================================
// Circle/Point Drawing
// ============================================================================

/// Draw a filled circle covering every pixel within `radius + 0.5` of the center.
///
/// A zero radius plots the single center pixel; a negative radius draws nothing.
/// Only rows that intersect the framebuffer are visited.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius < 0 {
        return;
    }
    fill_disc(fb, i64::from(cx), i64::from(cy), i64::from(radius), color);
}

fn fill_disc(fb: &mut Framebuffer, cx: i64, cy: i64, radius: i64, color: Rgba) {
    let (w, h) = (i64::from(fb.width()), i64::from(fb.height()));
    if cx + radius < 0 || cy + radius < 0 || cx - radius >= w || cy - radius >= h {
        return;
    }

    let limit = radius * radius + radius;
    let top = (cy - radius).max(0);
    let bottom = (cy + radius).min(h - 1);
    for y in top..=bottom {
        let dy = y - cy;
        let half = ((limit - dy * dy) as f64).sqrt().floor() as i64;
        let x_start = (cx - half).max(0);
        let x_end = (cx + half + 1).min(w);
        if x_start < x_end {
            fb.fill_rect(x_start as u32, y as u32, (x_end - x_start) as u32, 1, color);
        }
    }
}

/// Draw a point of the given radius (rendered as filled circle).
pub fn draw_point(fb: &mut Framebuffer, x: f32, y: f32, radius: f32, color: Rgba) {
    if !(x.is_finite() && y.is_finite()) {
        return;
    }
    draw_circle(fb, x.round() as i32, y.round() as i32, radius.round() as i32, color);
}

impl Drawable for Point {
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_point(fb, self.x, self.y, 0.0, color);
    }
}

// ============================================================================
// Tests
// ============================================================================
