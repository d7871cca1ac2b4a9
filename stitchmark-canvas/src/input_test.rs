#![allow(clippy::float_cmp)]

use super::*;

// --- Mode ---

#[test]
fn default_mode_is_view() {
    assert_eq!(Mode::default(), Mode::View);
}

#[test]
fn view_is_not_editing() {
    assert!(!Mode::View.is_editing());
}

#[test]
fn all_other_modes_are_editing() {
    for mode in [Mode::Annotate, Mode::Draw, Mode::Measure, Mode::PlaceGraphic, Mode::Fill] {
        assert!(mode.is_editing(), "{mode:?} should be an editing mode");
    }
}

#[test]
fn mode_serde_uses_snake_case() {
    assert_eq!(serde_json::to_string(&Mode::PlaceGraphic).unwrap(), "\"place_graphic\"");
    let back: Mode = serde_json::from_str("\"fill\"").unwrap();
    assert_eq!(back, Mode::Fill);
}

#[test]
fn mode_round_trips_through_serde() {
    for mode in [
        Mode::View,
        Mode::Annotate,
        Mode::Draw,
        Mode::Measure,
        Mode::PlaceGraphic,
        Mode::Fill,
    ] {
        let json = serde_json::to_string(&mode).unwrap();
        let back: Mode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mode);
    }
}

// --- LayerVisibility ---

#[test]
fn all_layers_visible_by_default() {
    let vis = LayerVisibility::default();
    assert!(vis.fills && vis.base && vis.graphics && vis.strokes && vis.lines && vis.pins);
}

#[test]
fn visibility_round_trips_through_serde() {
    let vis = LayerVisibility { pins: false, ..LayerVisibility::default() };
    let json = serde_json::to_string(&vis).unwrap();
    let back: LayerVisibility = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vis);
}

// --- StyleState ---

#[test]
fn style_defaults() {
    let style = StyleState::default();
    assert_eq!(style.stroke_color, "#1F1A17");
    assert_eq!(style.stroke_width, STROKE_DEFAULT_WIDTH_PCT);
    assert_eq!(style.fill_color, "#D94B4B");
    assert!(style.fill_pattern.is_none());
    assert_eq!(style.fill_tolerance, FILL_DEFAULT_TOLERANCE);
}

#[test]
fn default_colors_parse() {
    let style = StyleState::default();
    assert!(crate::layers::parse_hex_color(&style.stroke_color).is_ok());
    assert!(crate::layers::parse_hex_color(&style.fill_color).is_ok());
}

// --- UiState / Gesture ---

#[test]
fn ui_state_default() {
    let ui = UiState::default();
    assert_eq!(ui.mode, Mode::View);
    assert!(ui.selected.is_none());
}

#[test]
fn gesture_default_is_idle() {
    assert_eq!(Gesture::default(), Gesture::Idle);
}

#[test]
fn selection_compares_by_kind_and_id() {
    let id = uuid::Uuid::new_v4();
    assert_eq!(Selection::Pin(id), Selection::Pin(id));
    assert_ne!(Selection::Pin(id), Selection::Line(id));
    assert_ne!(Selection::Pin(id), Selection::Pin(uuid::Uuid::new_v4()));
}
