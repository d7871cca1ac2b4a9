//! Display-list composition: turns one side's layer state into an ordered
//! list of draw instructions.
//!
//! The list is pure data in percent coordinates. Hosts walk it front to
//! back onto whatever surface they have; [`crate::raster`] does the same
//! onto a pixmap. Emission order is the layer contract, bottom to top:
//!
//! 1. flood-fill composite
//! 2. base sketch image (multiply-blended when fills are underneath)
//! 3. placed graphics
//! 4. freehand strokes
//! 5. measurement lines, their labels, and (in measure mode) endpoint handles
//! 6. annotation pins
//!
//! Hidden layers are simply not emitted; the entities stay in the
//! document untouched.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::geometry::PercentPoint;
use crate::hit::LineEnd;
use crate::input::{Gesture, Mode, Selection, UiState};
use crate::layers::{EntityId, MeasurementSpec, SideLayers};
use crate::source::ImageSource;

/// How the base image composites over what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendHint {
    Normal,
    /// Keeps dark line art visible over fill paint; white paper drops out.
    Multiply,
}

/// One drawing instruction. Coordinates are percent image space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// The flood-fill composite bitmap, drawn first.
    FillLayer,
    /// The base sketch image.
    BaseImage { source: ImageSource, blend: BlendHint },
    /// A placed overlay graphic.
    Graphic {
        id: EntityId,
        center: PercentPoint,
        width: f64,
        image: ImageSource,
        selected: bool,
    },
    /// A committed freehand stroke.
    StrokePath {
        id: EntityId,
        points: Vec<PercentPoint>,
        color: String,
        width: f64,
    },
    /// The in-progress stroke under the pointer.
    GhostStroke { points: Vec<PercentPoint> },
    /// A measurement line with its label and, when the label matches a
    /// measurement code, the target value for read-only display.
    Line {
        id: EntityId,
        start: PercentPoint,
        end: PercentPoint,
        label: String,
        target: Option<f64>,
        selected: bool,
    },
    /// The provisional line of an active measure drag.
    GhostLine { start: PercentPoint, end: PercentPoint },
    /// A draggable endpoint handle. Emitted only in measure mode.
    EndpointHandle {
        line_id: EntityId,
        end: LineEnd,
        at: PercentPoint,
    },
    /// A numbered annotation pin, drawn topmost.
    PinMarker {
        id: EntityId,
        at: PercentPoint,
        number: u32,
        note: String,
        selected: bool,
    },
}

/// Find the target value for a measurement-line label.
///
/// Matching trims whitespace and ignores case, so a label typed `chest`
/// still surfaces the `CHEST` spec.
#[must_use]
pub fn lookup_target(measurements: &[MeasurementSpec], label: &str) -> Option<f64> {
    let wanted = label.trim();
    if wanted.is_empty() {
        return None;
    }
    measurements
        .iter()
        .find(|spec| spec.code.trim().eq_ignore_ascii_case(wanted))
        .map(|spec| spec.target)
}

/// Build the display list for one side.
#[must_use]
pub fn display_list(
    layers: &SideLayers,
    image: Option<&ImageSource>,
    ui: &UiState,
    gesture: &Gesture,
    measurements: &[MeasurementSpec],
) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    let fills_drawn = ui.visibility.fills && !layers.fills.is_empty() && image.is_some();
    if fills_drawn {
        ops.push(DrawOp::FillLayer);
    }

    if ui.visibility.base {
        if let Some(source) = image {
            let blend = if fills_drawn { BlendHint::Multiply } else { BlendHint::Normal };
            ops.push(DrawOp::BaseImage { source: source.clone(), blend });
        }
    }

    if ui.visibility.graphics {
        for graphic in &layers.graphics {
            ops.push(DrawOp::Graphic {
                id: graphic.id,
                center: PercentPoint::new(graphic.x, graphic.y),
                width: graphic.width,
                image: graphic.image.clone(),
                selected: is_selected(ui, Selection::Graphic(graphic.id), Mode::PlaceGraphic),
            });
        }
    }

    if ui.visibility.strokes {
        for stroke in &layers.strokes {
            ops.push(DrawOp::StrokePath {
                id: stroke.id,
                points: stroke.points.clone(),
                color: stroke.color.clone(),
                width: stroke.width,
            });
        }
        if let Gesture::Drawing { points } = gesture {
            if points.len() >= 2 {
                ops.push(DrawOp::GhostStroke { points: points.clone() });
            }
        }
    }

    if ui.visibility.lines {
        for line in &layers.lines {
            ops.push(DrawOp::Line {
                id: line.id,
                start: line.start,
                end: line.end,
                label: line.label.clone(),
                target: lookup_target(measurements, &line.label),
                selected: is_selected(ui, Selection::Line(line.id), Mode::Measure),
            });
        }
        if let Gesture::MeasureDrag { start, last } = gesture {
            ops.push(DrawOp::GhostLine { start: *start, end: *last });
        }
        if ui.mode == Mode::Measure {
            for line in &layers.lines {
                ops.push(DrawOp::EndpointHandle {
                    line_id: line.id,
                    end: LineEnd::Start,
                    at: line.start,
                });
                ops.push(DrawOp::EndpointHandle {
                    line_id: line.id,
                    end: LineEnd::End,
                    at: line.end,
                });
            }
        }
    }

    if ui.visibility.pins {
        for pin in &layers.pins {
            ops.push(DrawOp::PinMarker {
                id: pin.id,
                at: PercentPoint::new(pin.x, pin.y),
                number: pin.number,
                note: pin.note.clone(),
                selected: is_selected(ui, Selection::Pin(pin.id), Mode::Annotate),
            });
        }
    }

    ops
}

/// Selection affordances show only while the matching mode is active.
fn is_selected(ui: &UiState, candidate: Selection, mode: Mode) -> bool {
    ui.mode == mode && ui.selected == Some(candidate)
}
