#![allow(clippy::float_cmp)]

use super::*;

fn pct(x: f64, y: f64) -> PercentPoint {
    PercentPoint::new(x, y)
}

fn make_stroke(points: Vec<PercentPoint>) -> Stroke {
    Stroke {
        id: Uuid::new_v4(),
        points,
        color: "#1F1A17".to_string(),
        width: 0.6,
    }
}

fn make_line(start: PercentPoint, end: PercentPoint) -> MeasureLine {
    MeasureLine {
        id: Uuid::new_v4(),
        start,
        end,
        label: String::new(),
    }
}

fn make_graphic(x: f64, y: f64, width: f64) -> PlacedGraphic {
    PlacedGraphic {
        id: Uuid::new_v4(),
        x,
        y,
        width,
        image: ImageSource::new("logo.png"),
    }
}

fn make_fill(x: f64, y: f64) -> RegionFill {
    RegionFill {
        id: Uuid::new_v4(),
        x,
        y,
        color: "#D94B4B".to_string(),
        pattern: None,
        tolerance: 30,
    }
}

// --- Pin numbering ---

#[test]
fn add_pin_numbers_sequentially() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(10.0, 10.0));
    layers.add_pin(pct(20.0, 20.0));
    layers.add_pin(pct(30.0, 30.0));
    let numbers: Vec<u32> = layers.pins.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn add_pin_starts_with_empty_note() {
    let mut layers = SideLayers::default();
    let id = layers.add_pin(pct(5.0, 5.0));
    assert_eq!(layers.pin_mut(id).unwrap().note, "");
}

#[test]
fn remove_middle_pin_renumbers_contiguously() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(10.0, 10.0));
    let middle = layers.add_pin(pct(20.0, 20.0));
    layers.add_pin(pct(30.0, 30.0));

    assert!(layers.remove_pin(middle));

    let numbers: Vec<u32> = layers.pins.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    // Survivors keep their relative order.
    assert_eq!(layers.pins[0].x, 10.0);
    assert_eq!(layers.pins[1].x, 30.0);
}

#[test]
fn remove_unknown_pin_returns_false() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(10.0, 10.0));
    assert!(!layers.remove_pin(Uuid::new_v4()));
    assert_eq!(layers.pins.len(), 1);
}

#[test]
fn renumber_is_idempotent() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(1.0, 1.0));
    layers.add_pin(pct(2.0, 2.0));
    layers.renumber_pins();
    layers.renumber_pins();
    let numbers: Vec<u32> = layers.pins.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

// --- Lookups ---

#[test]
fn line_mut_finds_by_id() {
    let mut layers = SideLayers::default();
    let line = make_line(pct(10.0, 50.0), pct(90.0, 50.0));
    let id = line.id;
    layers.lines.push(line);
    layers.line_mut(id).unwrap().label = "CHEST".to_string();
    assert_eq!(layers.lines[0].label, "CHEST");
}

#[test]
fn graphic_mut_finds_by_id() {
    let mut layers = SideLayers::default();
    let graphic = make_graphic(40.0, 40.0, 20.0);
    let id = graphic.id;
    layers.graphics.push(graphic);
    assert!(layers.graphic_mut(id).is_some());
    assert!(layers.graphic_mut(Uuid::new_v4()).is_none());
}

// --- Hex colors ---

#[test]
fn parse_hex_color_lowercase() {
    assert_eq!(parse_hex_color("#d94b4b").unwrap(), Rgb { r: 0xD9, g: 0x4B, b: 0x4B });
}

#[test]
fn parse_hex_color_uppercase() {
    assert_eq!(parse_hex_color("#1F1A17").unwrap(), Rgb { r: 0x1F, g: 0x1A, b: 0x17 });
}

#[test]
fn parse_hex_color_black_and_white() {
    assert_eq!(parse_hex_color("#000000").unwrap(), Rgb { r: 0, g: 0, b: 0 });
    assert_eq!(parse_hex_color("#ffffff").unwrap(), Rgb { r: 255, g: 255, b: 255 });
}

#[test]
fn parse_hex_color_rejects_missing_hash() {
    assert!(matches!(parse_hex_color("d94b4b"), Err(LayerError::InvalidColor(_))));
}

#[test]
fn parse_hex_color_rejects_short_form() {
    assert!(matches!(parse_hex_color("#f00"), Err(LayerError::InvalidColor(_))));
}

#[test]
fn parse_hex_color_rejects_alpha_channel() {
    assert!(matches!(parse_hex_color("#d94b4bff"), Err(LayerError::InvalidColor(_))));
}

#[test]
fn parse_hex_color_rejects_non_hex_digits() {
    assert!(matches!(parse_hex_color("#zzzzzz"), Err(LayerError::InvalidColor(_))));
}

// --- Graphic width clamping ---

#[test]
fn clamp_graphic_width_bounds() {
    assert_eq!(clamp_graphic_width(0.5), 2.0);
    assert_eq!(clamp_graphic_width(95.0), 60.0);
    assert_eq!(clamp_graphic_width(20.0), 20.0);
}

#[test]
fn set_width_clamps() {
    let mut graphic = make_graphic(50.0, 50.0, 20.0);
    graphic.set_width(200.0);
    assert_eq!(graphic.width, 60.0);
    graphic.set_width(0.0);
    assert_eq!(graphic.width, 2.0);
}

// --- Validation ---

#[test]
fn validate_accepts_typical_layers() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(12.0, 34.0));
    layers.strokes.push(make_stroke(vec![pct(10.0, 10.0), pct(20.0, 20.0)]));
    layers.lines.push(make_line(pct(10.0, 50.0), pct(90.0, 50.0)));
    layers.graphics.push(make_graphic(40.0, 40.0, 20.0));
    layers.fills.push(make_fill(50.0, 50.0));
    assert!(layers.validate().is_ok());
}

#[test]
fn validate_rejects_pin_out_of_range() {
    let mut layers = SideLayers::default();
    layers.pins.push(Pin {
        id: Uuid::new_v4(),
        x: 101.0,
        y: 50.0,
        number: 1,
        note: String::new(),
    });
    assert!(matches!(
        layers.validate(),
        Err(LayerError::CoordinateOutOfRange { entity: "pin", axis: "x", .. })
    ));
}

#[test]
fn validate_rejects_single_point_stroke() {
    let mut layers = SideLayers::default();
    layers.strokes.push(make_stroke(vec![pct(10.0, 10.0)]));
    assert!(matches!(layers.validate(), Err(LayerError::DegenerateStroke)));
}

#[test]
fn validate_rejects_bad_stroke_color() {
    let mut layers = SideLayers::default();
    let mut stroke = make_stroke(vec![pct(10.0, 10.0), pct(20.0, 20.0)]);
    stroke.color = "red".to_string();
    layers.strokes.push(stroke);
    assert!(matches!(layers.validate(), Err(LayerError::InvalidColor(_))));
}

#[test]
fn validate_rejects_zero_stroke_width() {
    let mut layers = SideLayers::default();
    let mut stroke = make_stroke(vec![pct(10.0, 10.0), pct(20.0, 20.0)]);
    stroke.width = 0.0;
    layers.strokes.push(stroke);
    assert!(matches!(layers.validate(), Err(LayerError::NonPositiveWidth(_))));
}

#[test]
fn validate_rejects_nan_stroke_width() {
    let mut layers = SideLayers::default();
    let mut stroke = make_stroke(vec![pct(10.0, 10.0), pct(20.0, 20.0)]);
    stroke.width = f64::NAN;
    layers.strokes.push(stroke);
    assert!(matches!(layers.validate(), Err(LayerError::NonPositiveWidth(_))));
}

#[test]
fn validate_rejects_line_endpoint_out_of_range() {
    let mut layers = SideLayers::default();
    layers.lines.push(make_line(pct(10.0, 50.0), pct(90.0, -5.0)));
    assert!(matches!(
        layers.validate(),
        Err(LayerError::CoordinateOutOfRange { entity: "line", axis: "y", .. })
    ));
}

#[test]
fn validate_rejects_non_finite_graphic_width() {
    let mut layers = SideLayers::default();
    layers.graphics.push(make_graphic(40.0, 40.0, f64::INFINITY));
    assert!(matches!(layers.validate(), Err(LayerError::NonFiniteWidth(_))));
}

#[test]
fn validate_rejects_solid_fill_with_bad_color() {
    let mut layers = SideLayers::default();
    let mut fill = make_fill(50.0, 50.0);
    fill.color = "purple".to_string();
    layers.fills.push(fill);
    assert!(matches!(layers.validate(), Err(LayerError::InvalidColor(_))));
}

#[test]
fn validate_ignores_color_when_pattern_present() {
    // Pattern fills paint from the pattern; the color field is host UI
    // state and may hold anything.
    let mut layers = SideLayers::default();
    let mut fill = make_fill(50.0, 50.0);
    fill.color = "whatever".to_string();
    fill.pattern = Some(ImageSource::new("dots.png"));
    layers.fills.push(fill);
    assert!(layers.validate().is_ok());
}

#[test]
fn normalize_renumbers_and_clamps() {
    let mut layers = SideLayers::default();
    layers.pins.push(Pin { id: Uuid::new_v4(), x: 1.0, y: 1.0, number: 7, note: String::new() });
    layers.pins.push(Pin { id: Uuid::new_v4(), x: 2.0, y: 2.0, number: 9, note: String::new() });
    layers.graphics.push(make_graphic(40.0, 40.0, 99.0));
    layers.normalize();
    assert_eq!(layers.pins[0].number, 1);
    assert_eq!(layers.pins[1].number, 2);
    assert_eq!(layers.graphics[0].width, 60.0);
}

// --- Serde shape ---

#[test]
fn fill_tolerance_defaults_on_deserialize() {
    let json = r##"{"id":"6ec858f4-e3ca-4a3f-a4b5-5a68fd6f6a6b","x":50.0,"y":50.0,"color":"#D94B4B"}"##;
    let fill: RegionFill = serde_json::from_str(json).unwrap();
    assert_eq!(fill.tolerance, 30);
    assert!(fill.pattern.is_none());
}

#[test]
fn fill_without_pattern_omits_field() {
    let fill = make_fill(25.0, 75.0);
    let json = serde_json::to_string(&fill).unwrap();
    assert!(!json.contains("pattern"));
}

#[test]
fn side_layers_deserialize_from_empty_object() {
    let layers: SideLayers = serde_json::from_str("{}").unwrap();
    assert!(layers.is_empty());
}

#[test]
fn side_layers_round_trip() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(12.0, 34.0));
    layers.strokes.push(make_stroke(vec![pct(10.0, 10.0), pct(20.0, 20.0)]));
    layers.lines.push(make_line(pct(10.0, 50.0), pct(90.0, 50.0)));
    layers.graphics.push(make_graphic(40.0, 40.0, 20.0));
    layers.fills.push(make_fill(50.0, 50.0));

    let json = serde_json::to_string(&layers).unwrap();
    let back: SideLayers = serde_json::from_str(&json).unwrap();
    assert_eq!(back, layers);
}

#[test]
fn entity_count_sums_all_layers() {
    let mut layers = SideLayers::default();
    layers.add_pin(pct(1.0, 1.0));
    layers.fills.push(make_fill(2.0, 2.0));
    layers.fills.push(make_fill(3.0, 3.0));
    assert_eq!(layers.entity_count(), 3);
    assert!(!layers.is_empty());
}

#[test]
fn measurement_spec_round_trip() {
    let spec = MeasurementSpec { code: "CHEST".to_string(), target: 52.5 };
    let json = serde_json::to_string(&spec).unwrap();
    let back: MeasurementSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}
