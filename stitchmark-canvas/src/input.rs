//! Input model: interaction modes, layer visibility, style state, and the
//! gesture state machine.
//!
//! This module defines the types consumed by the canvas engine. `Mode`
//! captures which layer pointer events act on, `StyleState` holds the
//! host's current color/width/pattern choices, and `Gesture` is the
//! active pointer gesture tracked between pointer-down and pointer-up,
//! carrying the context needed to commit or discard on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FILL_DEFAULT_TOLERANCE, STROKE_DEFAULT_WIDTH_PCT};
use crate::geometry::PercentPoint;
use crate::hit::LineEnd;
use crate::layers::EntityId;
use crate::source::ImageSource;

/// Which interaction mode is active.
///
/// Exactly one mode is active at a time; pointer events dispatch on it
/// and act only on that mode's layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Read-only viewing (default).
    #[default]
    View,
    /// Drop and edit numbered annotation pins.
    Annotate,
    /// Capture freehand strokes.
    Draw,
    /// Create and adjust measurement lines.
    Measure,
    /// Place and reposition overlay graphics.
    PlaceGraphic,
    /// Record flood fills.
    Fill,
}

impl Mode {
    /// Whether this mode mutates layer content at all.
    #[must_use]
    pub fn is_editing(self) -> bool {
        self != Self::View
    }
}

/// Per-layer visibility toggles.
///
/// Hiding a layer removes it from the display list; the entities stay in
/// the document untouched.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    /// Flood-fill composite (bottom layer).
    pub fills: bool,
    /// The sketch image itself.
    pub base: bool,
    /// Placed overlay graphics.
    pub graphics: bool,
    /// Freehand strokes.
    pub strokes: bool,
    /// Measurement lines and their handles.
    pub lines: bool,
    /// Annotation pins (top layer).
    pub pins: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self { fills: true, base: true, graphics: true, strokes: true, lines: true, pins: true }
    }
}

/// Style inputs the host's toolbar supplies for new strokes and fills.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    /// Color for new freehand strokes, `#RRGGBB`.
    pub stroke_color: String,
    /// Width for new freehand strokes, percent of image width.
    pub stroke_width: f64,
    /// Color for new solid fills, `#RRGGBB`.
    pub fill_color: String,
    /// Pattern for new fills; when set it wins over `fill_color`.
    pub fill_pattern: Option<ImageSource>,
    /// Per-channel tolerance for new fills.
    pub fill_tolerance: u8,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            stroke_color: "#1F1A17".to_string(),
            stroke_width: STROKE_DEFAULT_WIDTH_PCT,
            fill_color: "#D94B4B".to_string(),
            fill_pattern: None,
            fill_tolerance: FILL_DEFAULT_TOLERANCE,
        }
    }
}

/// The entity the user last clicked, if any.
///
/// Selection outlives mode switches; edit affordances appear only while
/// the matching mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Pin(EntityId),
    Line(EntityId),
    Graphic(EntityId),
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active interaction mode.
    pub mode: Mode,
    /// The entity the user last clicked, if any.
    pub selected: Option<Selection>,
    /// Per-layer visibility toggles.
    pub visibility: LayerVisibility,
    /// Toolbar style choices for new entities.
    pub style: StyleState,
}

/// Internal state for the pointer gesture state machine.
///
/// Each active variant carries the context needed to commit or discard
/// the gesture on pointer-up or on a mode switch.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// A freehand stroke is being captured.
    Drawing {
        /// Points captured so far, in gesture order.
        points: Vec<PercentPoint>,
    },
    /// A new measurement line is being dragged out.
    MeasureDrag {
        /// Anchor endpoint where the drag started.
        start: PercentPoint,
        /// Pointer position at the previous event; the provisional second
        /// endpoint.
        last: PercentPoint,
    },
    /// One endpoint of an existing line is being repositioned.
    EndpointDrag {
        /// Id of the line being edited.
        id: EntityId,
        /// Which endpoint is being dragged.
        end: LineEnd,
    },
    /// A placed graphic is being dragged by its body.
    GraphicDrag {
        /// Id of the graphic being moved.
        id: EntityId,
        /// Pointer offset from the graphic's center at grab time, percent
        /// units, so the graphic doesn't jump under the finger.
        grab_dx: f64,
        grab_dy: f64,
    },
    /// A placement click happened and the host is choosing a file.
    ///
    /// Held until [`crate::engine::Engine::provide_graphic`] or a
    /// cancel/mode switch resolves it.
    PendingPlacement {
        /// Where the graphic will be centered once the file arrives.
        at: PercentPoint,
    },
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}
