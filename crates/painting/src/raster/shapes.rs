//! Filled geometry: dots and stroked polylines

use crate::constants::MITER_LIMIT;
use crate::types::{Dimensions, Point};

use super::{Coverage, PixelRegion};

/// How consecutive polyline segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Miter,
}

/// How the open ends of a polyline finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Butt,
}

/// Something that can be filled onto a surface
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Filled disc
    Circle { center: Point, radius: f32 },
    /// Filled axis-aligned square
    Square { center: Point, half_side: f32 },
    /// Stroked path of constant width
    Polyline {
        points: &'a [Point],
        width: f32,
        join: LineJoin,
        cap: LineCap,
    },
}

impl Shape<'_> {
    /// Float bounds (min_x, min_y, max_x, max_y) enclosing the shape
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            Shape::Circle { center, radius } => Some((
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
            Shape::Square { center, half_side } => Some((
                center.x - half_side,
                center.y - half_side,
                center.x + half_side,
                center.y + half_side,
            )),
            Shape::Polyline {
                points,
                width,
                join,
                ..
            } => {
                let first = points.first()?;
                // Miter tips can reach MITER_LIMIT half-widths out
                let pad = match join {
                    LineJoin::Miter => width / 2.0 * MITER_LIMIT,
                    LineJoin::Round => width / 2.0,
                };
                let mut b = (first.x, first.y, first.x, first.y);
                for p in points {
                    b.0 = b.0.min(p.x);
                    b.1 = b.1.min(p.y);
                    b.2 = b.2.max(p.x);
                    b.3 = b.3.max(p.y);
                }
                Some((b.0 - pad, b.1 - pad, b.2 + pad, b.3 + pad))
            }
        }
    }

    /// Compute the covered samples of this shape on a surface of the given size.
    ///
    /// Returns None when the shape is degenerate or entirely off-surface.
    pub fn rasterize(&self, surface: Dimensions, antialias: bool) -> Option<Coverage> {
        let region = PixelRegion::from_bounds(self.bounds()?, surface)?;
        let mut coverage = Coverage::new(region, antialias);

        match *self {
            Shape::Circle { center, radius } => {
                if radius <= 0.0 {
                    return None;
                }
                stamp_circle(&mut coverage, center, radius);
            }
            Shape::Square { center, half_side } => {
                if half_side <= 0.0 {
                    return None;
                }
                stamp_square(&mut coverage, center, half_side);
            }
            Shape::Polyline {
                points,
                width,
                join,
                cap,
            } => {
                if width <= 0.0 {
                    return None;
                }
                stamp_polyline(&mut coverage, points, width / 2.0, join, cap);
            }
        }

        if coverage.is_empty() {
            None
        } else {
            Some(coverage)
        }
    }
}

fn stamp_circle(coverage: &mut Coverage, center: Point, radius: f32) {
    let r_sq = radius * radius;
    let bounds = (
        center.x - radius,
        center.y - radius,
        center.x + radius,
        center.y + radius,
    );
    coverage.stamp(bounds, |x, y| {
        let dx = x - center.x;
        let dy = y - center.y;
        dx * dx + dy * dy <= r_sq
    });
}

fn stamp_square(coverage: &mut Coverage, center: Point, half_side: f32) {
    let bounds = (
        center.x - half_side,
        center.y - half_side,
        center.x + half_side,
        center.y + half_side,
    );
    coverage.stamp(bounds, |x, y| {
        (x - center.x).abs() <= half_side && (y - center.y).abs() <= half_side
    });
}

fn stamp_polyline(
    coverage: &mut Coverage,
    points: &[Point],
    half_width: f32,
    join: LineJoin,
    cap: LineCap,
) {
    // Zero-length segments carry no direction
    let mut path: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if path.last() != Some(&p) {
            path.push(p);
        }
    }

    if path.len() < 2 {
        // Nothing to stroke; only a round cap leaves a mark
        if let (Some(&p), LineCap::Round) = (path.first(), cap) {
            stamp_circle(coverage, p, half_width);
        }
        return;
    }

    for pair in path.windows(2) {
        stamp_segment_body(coverage, pair[0], pair[1], half_width);
    }

    for triple in path.windows(3) {
        match join {
            LineJoin::Round => stamp_circle(coverage, triple[1], half_width),
            LineJoin::Miter => stamp_miter_join(coverage, triple[0], triple[1], triple[2], half_width),
        }
    }

    if cap == LineCap::Round {
        stamp_circle(coverage, path[0], half_width);
        stamp_circle(coverage, path[path.len() - 1], half_width);
    }
}

/// The rectangle swept by a segment, without caps
fn stamp_segment_body(coverage: &mut Coverage, a: Point, b: Point, half_width: f32) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return;
    }
    let ux = dx / len;
    let uy = dy / len;
    let bounds = (
        a.x.min(b.x) - half_width,
        a.y.min(b.y) - half_width,
        a.x.max(b.x) + half_width,
        a.y.max(b.y) + half_width,
    );
    coverage.stamp(bounds, |x, y| {
        let px = x - a.x;
        let py = y - a.y;
        let along = px * ux + py * uy;
        let across = (px * -uy + py * ux).abs();
        (0.0..=len).contains(&along) && across <= half_width
    });
}

/// Fill the outer corner between two segments meeting at `v`, falling back to
/// a bevel when the miter would exceed the limit
fn stamp_miter_join(coverage: &mut Coverage, a: Point, v: Point, b: Point, half_width: f32) {
    let Some(d1) = direction(a, v) else { return };
    let Some(d2) = direction(v, b) else { return };

    let cross = d1.0 * d2.1 - d1.1 * d2.0;
    if cross.abs() < 1e-6 {
        // Straight continuation or full reversal: no outer corner
        return;
    }

    // Offset to the outside of the turn
    let side = if cross > 0.0 { -1.0 } else { 1.0 };
    let n1 = (-d1.1 * half_width * side, d1.0 * half_width * side);
    let n2 = (-d2.1 * half_width * side, d2.0 * half_width * side);
    let p1 = Point::new(v.x + n1.0, v.y + n1.1);
    let p2 = Point::new(v.x + n2.0, v.y + n2.1);

    let dot = (d1.0 * d2.0 + d1.1 * d2.1).clamp(-1.0, 1.0);
    let cos_half = ((1.0 + dot) / 2.0).sqrt();
    let ratio = if cos_half > 1e-6 { 1.0 / cos_half } else { f32::INFINITY };

    let polygon: Vec<Point> = if ratio > MITER_LIMIT {
        vec![v, p1, p2]
    } else {
        let mx = n1.0 + n2.0;
        let my = n1.1 + n2.1;
        let m_len = (mx * mx + my * my).sqrt();
        if m_len <= f32::EPSILON {
            return;
        }
        let reach = half_width * ratio;
        let tip = Point::new(v.x + mx / m_len * reach, v.y + my / m_len * reach);
        vec![v, p1, tip, p2]
    };

    let mut bounds = (v.x, v.y, v.x, v.y);
    for p in &polygon {
        bounds.0 = bounds.0.min(p.x);
        bounds.1 = bounds.1.min(p.y);
        bounds.2 = bounds.2.max(p.x);
        bounds.3 = bounds.3.max(p.y);
    }
    coverage.stamp(bounds, |x, y| inside_convex(&polygon, x, y));
}

fn direction(from: Point, to: Point) -> Option<(f32, f32)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        None
    } else {
        Some((dx / len, dy / len))
    }
}

/// Point-in-convex-polygon, either winding, edges inclusive
fn inside_convex(polygon: &[Point], x: f32, y: f32) -> bool {
    let mut positive = false;
    let mut negative = false;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
        if cross > 0.0 {
            positive = true;
        } else if cross < 0.0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }
    }
    true
}
