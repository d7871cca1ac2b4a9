//! Hit-testing for pointer events against layer entities.
//!
//! Entities store percent coordinates but hit slop is a screen-space
//! quantity, so every test converts the entity to screen pixels through
//! the container box and measures there. Within a layer the topmost
//! entity (last in list order) wins.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS_PX, LINE_BODY_RADIUS_PX, PIN_RADIUS_PX};
use crate::geometry::{ContainerBox, PercentPoint, ScreenPoint};
use crate::layers::{EntityId, SideLayers};

/// Which end of a measurement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// The topmost pin within tap radius of `at`, if any.
#[must_use]
pub fn pin_at(layers: &SideLayers, cb: &ContainerBox, at: ScreenPoint) -> Option<EntityId> {
    layers
        .pins
        .iter()
        .rev()
        .find(|pin| {
            let center = cb.to_screen(PercentPoint::new(pin.x, pin.y));
            dist(at, center) <= PIN_RADIUS_PX
        })
        .map(|pin| pin.id)
}

/// The topmost line endpoint handle within grab radius of `at`, if any.
///
/// When both ends of one line are in range the nearer one wins, so very
/// short lines stay editable at both ends.
#[must_use]
pub fn line_endpoint_at(
    layers: &SideLayers,
    cb: &ContainerBox,
    at: ScreenPoint,
) -> Option<(EntityId, LineEnd)> {
    for line in layers.lines.iter().rev() {
        let d_start = dist(at, cb.to_screen(line.start));
        let d_end = dist(at, cb.to_screen(line.end));
        let (end, d) = if d_start <= d_end {
            (LineEnd::Start, d_start)
        } else {
            (LineEnd::End, d_end)
        };
        if d <= HANDLE_RADIUS_PX {
            return Some((line.id, end));
        }
    }
    None
}

/// The topmost line whose body passes within tap radius of `at`, if any.
#[must_use]
pub fn line_body_at(layers: &SideLayers, cb: &ContainerBox, at: ScreenPoint) -> Option<EntityId> {
    layers
        .lines
        .iter()
        .rev()
        .find(|line| {
            let a = cb.to_screen(line.start);
            let b = cb.to_screen(line.end);
            distance_to_segment(at, a, b) <= LINE_BODY_RADIUS_PX
        })
        .map(|line| line.id)
}

/// The topmost placed graphic whose box contains `at`, if any.
///
/// Graphics store only a width; the hit box is a square of that width
/// centered on the graphic, which tracks the rendered footprint closely
/// enough for grabbing.
#[must_use]
pub fn graphic_at(layers: &SideLayers, cb: &ContainerBox, at: ScreenPoint) -> Option<EntityId> {
    layers
        .graphics
        .iter()
        .rev()
        .find(|graphic| {
            let center = cb.to_screen(PercentPoint::new(graphic.x, graphic.y));
            let half = graphic.width / 100.0 * cb.width / 2.0;
            (at.x - center.x).abs() <= half && (at.y - center.y).abs() <= half
        })
        .map(|graphic| graphic.id)
}

fn dist(a: ScreenPoint, b: ScreenPoint) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Shortest distance from `point` to the segment `a`–`b`.
fn distance_to_segment(point: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);
    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;
    if ab_len_sq <= f64::EPSILON {
        return ap.0.hypot(ap.1);
    }
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);
    let projection = ScreenPoint::new(a.x + ab.0 * t, a.y + ab.1 * t);
    dist(point, projection)
}
