#![allow(clippy::float_cmp)]

use super::*;
use crate::layers::{MeasureLine, PlacedGraphic};
use crate::source::ImageSource;
use uuid::Uuid;

// A 1000x1000 box at the origin makes percent and pixel*10 line up.
fn unit_box() -> ContainerBox {
    ContainerBox::new(0.0, 0.0, 1000.0, 1000.0)
}

fn add_pin_at(layers: &mut SideLayers, x: f64, y: f64) -> EntityId {
    layers.add_pin(PercentPoint::new(x, y))
}

fn add_line(layers: &mut SideLayers, sx: f64, sy: f64, ex: f64, ey: f64) -> EntityId {
    let line = MeasureLine {
        id: Uuid::new_v4(),
        start: PercentPoint::new(sx, sy),
        end: PercentPoint::new(ex, ey),
        label: String::new(),
    };
    let id = line.id;
    layers.lines.push(line);
    id
}

fn add_graphic(layers: &mut SideLayers, x: f64, y: f64, width: f64) -> EntityId {
    let graphic = PlacedGraphic {
        id: Uuid::new_v4(),
        x,
        y,
        width,
        image: ImageSource::new("logo.png"),
    };
    let id = graphic.id;
    layers.graphics.push(graphic);
    id
}

// --- Pins ---

#[test]
fn pin_hit_at_center() {
    let mut layers = SideLayers::default();
    let id = add_pin_at(&mut layers, 50.0, 50.0);
    assert_eq!(pin_at(&layers, &unit_box(), ScreenPoint::new(500.0, 500.0)), Some(id));
}

#[test]
fn pin_hit_within_slop() {
    let mut layers = SideLayers::default();
    let id = add_pin_at(&mut layers, 50.0, 50.0);
    // 10px off, inside the 12px slop.
    assert_eq!(pin_at(&layers, &unit_box(), ScreenPoint::new(510.0, 500.0)), Some(id));
}

#[test]
fn pin_miss_outside_slop() {
    let mut layers = SideLayers::default();
    add_pin_at(&mut layers, 50.0, 50.0);
    assert_eq!(pin_at(&layers, &unit_box(), ScreenPoint::new(520.0, 500.0)), None);
}

#[test]
fn overlapping_pins_topmost_wins() {
    let mut layers = SideLayers::default();
    add_pin_at(&mut layers, 50.0, 50.0);
    let top = add_pin_at(&mut layers, 50.2, 50.0);
    assert_eq!(pin_at(&layers, &unit_box(), ScreenPoint::new(501.0, 500.0)), Some(top));
}

#[test]
fn pin_slop_is_screen_space() {
    // On a tiny 100px container the same 10px slop covers 10% of the image.
    let mut layers = SideLayers::default();
    let id = add_pin_at(&mut layers, 50.0, 50.0);
    let small = ContainerBox::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(pin_at(&layers, &small, ScreenPoint::new(60.0, 50.0)), Some(id));
}

// --- Line endpoints ---

#[test]
fn endpoint_hit_start() {
    let mut layers = SideLayers::default();
    let id = add_line(&mut layers, 10.0, 50.0, 90.0, 50.0);
    let hit = line_endpoint_at(&layers, &unit_box(), ScreenPoint::new(103.0, 500.0));
    assert_eq!(hit, Some((id, LineEnd::Start)));
}

#[test]
fn endpoint_hit_end() {
    let mut layers = SideLayers::default();
    let id = add_line(&mut layers, 10.0, 50.0, 90.0, 50.0);
    let hit = line_endpoint_at(&layers, &unit_box(), ScreenPoint::new(897.0, 503.0));
    assert_eq!(hit, Some((id, LineEnd::End)));
}

#[test]
fn endpoint_miss_on_line_middle() {
    let mut layers = SideLayers::default();
    add_line(&mut layers, 10.0, 50.0, 90.0, 50.0);
    assert_eq!(line_endpoint_at(&layers, &unit_box(), ScreenPoint::new(500.0, 500.0)), None);
}

#[test]
fn short_line_nearer_endpoint_wins() {
    let mut layers = SideLayers::default();
    let id = add_line(&mut layers, 50.0, 50.0, 51.0, 50.0);
    // Both ends are within 8px; the pointer sits closer to the end.
    let hit = line_endpoint_at(&layers, &unit_box(), ScreenPoint::new(509.0, 500.0));
    assert_eq!(hit, Some((id, LineEnd::End)));
}

// --- Line bodies ---

#[test]
fn line_body_hit_mid_span() {
    let mut layers = SideLayers::default();
    let id = add_line(&mut layers, 10.0, 50.0, 90.0, 50.0);
    assert_eq!(line_body_at(&layers, &unit_box(), ScreenPoint::new(500.0, 504.0)), Some(id));
}

#[test]
fn line_body_miss_beyond_slop() {
    let mut layers = SideLayers::default();
    add_line(&mut layers, 10.0, 50.0, 90.0, 50.0);
    assert_eq!(line_body_at(&layers, &unit_box(), ScreenPoint::new(500.0, 510.0)), None);
}

#[test]
fn line_body_miss_past_segment_end() {
    // The distance is to the segment, not the infinite line.
    let mut layers = SideLayers::default();
    add_line(&mut layers, 10.0, 50.0, 40.0, 50.0);
    assert_eq!(line_body_at(&layers, &unit_box(), ScreenPoint::new(600.0, 500.0)), None);
}

#[test]
fn degenerate_line_hits_like_a_point() {
    let mut layers = SideLayers::default();
    let id = add_line(&mut layers, 50.0, 50.0, 50.0, 50.0);
    assert_eq!(line_body_at(&layers, &unit_box(), ScreenPoint::new(503.0, 500.0)), Some(id));
}

// --- Graphics ---

#[test]
fn graphic_hit_inside_box() {
    let mut layers = SideLayers::default();
    let id = add_graphic(&mut layers, 50.0, 50.0, 20.0);
    // Half-width is 100px on a 1000px box.
    assert_eq!(graphic_at(&layers, &unit_box(), ScreenPoint::new(590.0, 420.0)), Some(id));
}

#[test]
fn graphic_miss_outside_box() {
    let mut layers = SideLayers::default();
    add_graphic(&mut layers, 50.0, 50.0, 20.0);
    assert_eq!(graphic_at(&layers, &unit_box(), ScreenPoint::new(620.0, 500.0)), None);
}

#[test]
fn overlapping_graphics_topmost_wins() {
    let mut layers = SideLayers::default();
    add_graphic(&mut layers, 50.0, 50.0, 20.0);
    let top = add_graphic(&mut layers, 52.0, 50.0, 20.0);
    assert_eq!(graphic_at(&layers, &unit_box(), ScreenPoint::new(510.0, 500.0)), Some(top));
}

#[test]
fn empty_layers_hit_nothing() {
    let layers = SideLayers::default();
    let at = ScreenPoint::new(500.0, 500.0);
    assert_eq!(pin_at(&layers, &unit_box(), at), None);
    assert_eq!(line_endpoint_at(&layers, &unit_box(), at), None);
    assert_eq!(line_body_at(&layers, &unit_box(), at), None);
    assert_eq!(graphic_at(&layers, &unit_box(), at), None);
}
