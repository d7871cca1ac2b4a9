//! Engine core: pointer dispatch, gesture lifecycle, and host actions.
//!
//! The engine owns one side's working state (layer snapshot, sketch
//! reference, container box, UI state, active gesture) and exposes
//! pointer handlers that return [`Action`] values for the host to
//! process. It never touches a screen or a file chooser itself; anything
//! that needs the outside world comes back as an action.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use image::RgbaImage;
use tracing::debug;
use uuid::Uuid;

use crate::consts::{GRAPHIC_DEFAULT_WIDTH_PCT, MEASURE_MIN_SPAN_PCT};
use crate::fill::{self, BitmapCache};
use crate::geometry::{ContainerBox, PercentPoint, PointerInput, ScreenPoint};
use crate::hit::{self, LineEnd};
use crate::input::{Gesture, LayerVisibility, Mode, Selection, StyleState, UiState};
use crate::layers::{
    EntityId, MeasureLine, MeasurementSpec, Pin, PlacedGraphic, RegionFill, SideLayers, Stroke,
};
use crate::render::{self, DrawOp};
use crate::source::ImageSource;

/// Actions returned from input handlers for the host to process.
///
/// List-carrying variants hand back the whole new list, so the host can
/// store it without diffing.
#[derive(Debug, Clone)]
pub enum Action {
    PinsChanged(Vec<Pin>),
    StrokesChanged(Vec<Stroke>),
    LinesChanged(Vec<MeasureLine>),
    GraphicsChanged(Vec<PlacedGraphic>),
    FillsChanged(Vec<RegionFill>),
    /// The active selection changed.
    SelectionChanged(Option<Selection>),
    /// A placement click landed on empty canvas; the host should open a
    /// file chooser and answer with
    /// [`Engine::provide_graphic`] or [`Engine::cancel_pending_placement`].
    GraphicFileRequested { at: PercentPoint },
    /// The replace-image control was used; the host should open a file
    /// chooser and answer with [`Engine::set_image`].
    ImageReplaceRequested,
    /// Something visible changed; the host should redraw.
    RenderNeeded,
}

/// The canvas engine for one garment side.
pub struct Engine {
    layers: SideLayers,
    image: Option<ImageSource>,
    container: ContainerBox,
    ui: UiState,
    gesture: Gesture,
    cache: BitmapCache,
    composite: Option<RgbaImage>,
    composite_stale: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            layers: SideLayers::default(),
            image: None,
            container: ContainerBox::default(),
            ui: UiState::default(),
            gesture: Gesture::Idle,
            cache: BitmapCache::new(),
            composite: None,
            composite_stale: true,
        }
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Host data inputs ---

    /// Point the canvas at a (possibly different) sketch image.
    pub fn set_image(&mut self, image: Option<ImageSource>) {
        if self.image != image {
            self.image = image;
            self.composite_stale = true;
        }
    }

    /// Replace the working layer snapshot, e.g. after a side switch.
    pub fn sync_layers(&mut self, layers: SideLayers) {
        self.layers = layers;
        self.composite_stale = true;
    }

    /// Update the rendered box the host is displaying the image in.
    pub fn set_container(&mut self, container: ContainerBox) {
        self.container = container;
    }

    /// Update toolbar style choices for new strokes and fills.
    pub fn set_style(&mut self, style: StyleState) {
        self.ui.style = style;
    }

    /// Update per-layer visibility toggles.
    pub fn set_visibility(&mut self, visibility: LayerVisibility) {
        self.ui.visibility = visibility;
    }

    /// Switch the interaction mode, resolving any in-flight gesture
    /// first. Returns the actions produced by that resolution.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.mode == mode {
            return actions;
        }
        self.finish_gesture(&mut actions);
        debug!(from = ?self.ui.mode, to = ?mode, "mode switch");
        self.ui.mode = mode;
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, input: &PointerInput) -> Vec<Action> {
        let Some(screen) = input.position() else {
            return Vec::new();
        };
        let at = self.container.to_percent(screen);
        let mut actions = Vec::new();
        match self.ui.mode {
            Mode::View => {}
            Mode::Annotate => self.annotate_down(screen, at, &mut actions),
            Mode::Draw => {
                if at.in_bounds() {
                    self.gesture = Gesture::Drawing { points: vec![at] };
                }
            }
            Mode::Measure => self.measure_down(screen, at, &mut actions),
            Mode::PlaceGraphic => self.place_down(screen, at, &mut actions),
            Mode::Fill => self.fill_down(at, &mut actions),
        }
        actions
    }

    pub fn on_pointer_move(&mut self, input: &PointerInput) -> Vec<Action> {
        let Some(screen) = input.position() else {
            return Vec::new();
        };
        let at = self.container.to_percent(screen).clamped();
        let mut actions = Vec::new();
        match &mut self.gesture {
            Gesture::Idle | Gesture::PendingPlacement { .. } => {}
            Gesture::Drawing { points } => {
                if points.last() != Some(&at) {
                    points.push(at);
                    actions.push(Action::RenderNeeded);
                }
            }
            Gesture::MeasureDrag { last, .. } => {
                *last = at;
                actions.push(Action::RenderNeeded);
            }
            Gesture::EndpointDrag { id, end } => {
                let (id, end) = (*id, *end);
                if let Some(line) = self.layers.line_mut(id) {
                    match end {
                        LineEnd::Start => line.start = at,
                        LineEnd::End => line.end = at,
                    }
                    actions.push(Action::LinesChanged(self.layers.lines.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
            Gesture::GraphicDrag { id, grab_dx, grab_dy } => {
                let (id, dx, dy) = (*id, *grab_dx, *grab_dy);
                if let Some(graphic) = self.layers.graphic_mut(id) {
                    graphic.x = (at.x - dx).clamp(0.0, 100.0);
                    graphic.y = (at.y - dy).clamp(0.0, 100.0);
                    actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    pub fn on_pointer_up(&mut self, input: &PointerInput) -> Vec<Action> {
        let release = input.position().map(|s| self.container.to_percent(s).clamped());
        let mut actions = Vec::new();
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            // The file chooser is still open; the gesture outlives the
            // pointer.
            Gesture::PendingPlacement { at } => {
                self.gesture = Gesture::PendingPlacement { at };
            }
            Gesture::Drawing { mut points } => {
                if let Some(at) = release {
                    if points.last() != Some(&at) {
                        points.push(at);
                    }
                }
                self.commit_stroke(points, &mut actions);
                actions.push(Action::RenderNeeded);
            }
            Gesture::MeasureDrag { start, last } => {
                let end = release.unwrap_or(last);
                if (end.x - start.x).abs() > MEASURE_MIN_SPAN_PCT {
                    let line = MeasureLine {
                        id: Uuid::new_v4(),
                        start,
                        end,
                        label: String::new(),
                    };
                    let id = line.id;
                    self.layers.lines.push(line);
                    actions.push(Action::LinesChanged(self.layers.lines.clone()));
                    self.select(Some(Selection::Line(id)), &mut actions);
                }
                actions.push(Action::RenderNeeded);
            }
            Gesture::EndpointDrag { .. } | Gesture::GraphicDrag { .. } => {
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    // --- Explicit host commands ---

    /// Resolve an outstanding placement request with the chosen image.
    /// A file with no placement outstanding is dropped.
    pub fn provide_graphic(&mut self, image: ImageSource) -> Vec<Action> {
        let mut actions = Vec::new();
        let at = match &self.gesture {
            Gesture::PendingPlacement { at } => *at,
            _ => return actions,
        };
        self.gesture = Gesture::Idle;
        let graphic = PlacedGraphic {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            width: GRAPHIC_DEFAULT_WIDTH_PCT,
            image,
        };
        let id = graphic.id;
        self.layers.graphics.push(graphic);
        actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
        self.select(Some(Selection::Graphic(id)), &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abandon an outstanding placement request (chooser dismissed).
    pub fn cancel_pending_placement(&mut self) {
        if matches!(self.gesture, Gesture::PendingPlacement { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Route the replace-image control through the action stream, so
    /// image swaps follow the same host flow as graphic placement.
    #[must_use]
    pub fn request_image_replace(&self) -> Vec<Action> {
        vec![Action::ImageReplaceRequested]
    }

    /// Store edited note text on a pin.
    pub fn set_pin_note(&mut self, id: EntityId, note: impl Into<String>) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(pin) = self.layers.pin_mut(id) {
            pin.note = note.into();
            actions.push(Action::PinsChanged(self.layers.pins.clone()));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Store edited label text on a measurement line.
    pub fn set_line_label(&mut self, id: EntityId, label: impl Into<String>) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(line) = self.layers.line_mut(id) {
            line.label = label.into();
            actions.push(Action::LinesChanged(self.layers.lines.clone()));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Resize a placed graphic (slider input). The width is clamped.
    pub fn resize_graphic(&mut self, id: EntityId, width: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(graphic) = self.layers.graphic_mut(id) {
            graphic.set_width(width);
            actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Swap the image of a placed graphic, keeping position and size.
    pub fn replace_graphic_image(&mut self, id: EntityId, image: ImageSource) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(graphic) = self.layers.graphic_mut(id) {
            graphic.image = image;
            actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Delete the selected entity, if its edit affordance is available
    /// in the current mode.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(selection) = self.ui.selected else {
            return actions;
        };
        let removed = match (self.ui.mode, selection) {
            (Mode::Annotate, Selection::Pin(id)) => {
                let removed = self.layers.remove_pin(id);
                if removed {
                    actions.push(Action::PinsChanged(self.layers.pins.clone()));
                }
                removed
            }
            (Mode::Measure, Selection::Line(id)) => {
                let before = self.layers.lines.len();
                self.layers.lines.retain(|l| l.id != id);
                let removed = self.layers.lines.len() != before;
                if removed {
                    actions.push(Action::LinesChanged(self.layers.lines.clone()));
                }
                removed
            }
            (Mode::PlaceGraphic, Selection::Graphic(id)) => {
                let before = self.layers.graphics.len();
                self.layers.graphics.retain(|g| g.id != id);
                let removed = self.layers.graphics.len() != before;
                if removed {
                    actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
                }
                removed
            }
            _ => false,
        };
        if removed {
            self.select(None, &mut actions);
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Remove the most recent entity of the active mode's layer.
    ///
    /// Undo is mode-scoped: annotate pops pins, draw pops strokes, and
    /// so on. View mode has nothing to undo.
    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.ui.mode {
            Mode::View => {}
            Mode::Annotate => {
                if let Some(pin) = self.layers.pins.pop() {
                    self.drop_selection_of(Selection::Pin(pin.id), &mut actions);
                    actions.push(Action::PinsChanged(self.layers.pins.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
            Mode::Draw => {
                if self.layers.strokes.pop().is_some() {
                    actions.push(Action::StrokesChanged(self.layers.strokes.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
            Mode::Measure => {
                if let Some(line) = self.layers.lines.pop() {
                    self.drop_selection_of(Selection::Line(line.id), &mut actions);
                    actions.push(Action::LinesChanged(self.layers.lines.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
            Mode::PlaceGraphic => {
                if let Some(graphic) = self.layers.graphics.pop() {
                    self.drop_selection_of(Selection::Graphic(graphic.id), &mut actions);
                    actions.push(Action::GraphicsChanged(self.layers.graphics.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
            Mode::Fill => {
                if self.layers.fills.pop().is_some() {
                    self.composite_stale = true;
                    actions.push(Action::FillsChanged(self.layers.fills.clone()));
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    // --- Rendering ---

    /// The display list for the current state.
    #[must_use]
    pub fn display_list(&self, measurements: &[MeasurementSpec]) -> Vec<DrawOp> {
        render::display_list(&self.layers, self.image.as_ref(), &self.ui, &self.gesture, measurements)
    }

    /// The flood-fill composite for the current sketch and fill list,
    /// recomputed only when either has changed since the last call.
    pub fn fill_composite(&mut self) -> Option<&RgbaImage> {
        if self.composite_stale {
            self.composite =
                fill::compose_side(&mut self.cache, self.image.as_ref(), &self.layers.fills);
            self.composite_stale = false;
        }
        self.composite.as_ref()
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.ui.mode
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.ui.selected
    }

    /// Where a placement click is waiting for its file, if anywhere.
    #[must_use]
    pub fn pending_placement(&self) -> Option<PercentPoint> {
        match &self.gesture {
            Gesture::PendingPlacement { at } => Some(*at),
            _ => None,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &SideLayers {
        &self.layers
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    // --- Mode handlers ---

    fn annotate_down(&mut self, screen: ScreenPoint, at: PercentPoint, actions: &mut Vec<Action>) {
        if let Some(id) = hit::pin_at(&self.layers, &self.container, screen) {
            self.select(Some(Selection::Pin(id)), actions);
            actions.push(Action::RenderNeeded);
            return;
        }
        if !at.in_bounds() {
            return;
        }
        let id = self.layers.add_pin(at);
        actions.push(Action::PinsChanged(self.layers.pins.clone()));
        self.select(Some(Selection::Pin(id)), actions);
        actions.push(Action::RenderNeeded);
    }

    fn measure_down(&mut self, screen: ScreenPoint, at: PercentPoint, actions: &mut Vec<Action>) {
        if let Some((id, end)) = hit::line_endpoint_at(&self.layers, &self.container, screen) {
            self.gesture = Gesture::EndpointDrag { id, end };
            self.select(Some(Selection::Line(id)), actions);
            actions.push(Action::RenderNeeded);
            return;
        }
        if let Some(id) = hit::line_body_at(&self.layers, &self.container, screen) {
            self.select(Some(Selection::Line(id)), actions);
            actions.push(Action::RenderNeeded);
            return;
        }
        if at.in_bounds() {
            self.gesture = Gesture::MeasureDrag { start: at, last: at };
            actions.push(Action::RenderNeeded);
        }
    }

    fn place_down(&mut self, screen: ScreenPoint, at: PercentPoint, actions: &mut Vec<Action>) {
        if let Some(id) = hit::graphic_at(&self.layers, &self.container, screen) {
            if let Some(graphic) = self.layers.graphics.iter().find(|g| g.id == id) {
                self.gesture = Gesture::GraphicDrag {
                    id,
                    grab_dx: at.x - graphic.x,
                    grab_dy: at.y - graphic.y,
                };
            }
            self.select(Some(Selection::Graphic(id)), actions);
            actions.push(Action::RenderNeeded);
            return;
        }
        if at.in_bounds() {
            self.gesture = Gesture::PendingPlacement { at };
            actions.push(Action::GraphicFileRequested { at });
        }
    }

    fn fill_down(&mut self, at: PercentPoint, actions: &mut Vec<Action>) {
        if !at.in_bounds() {
            return;
        }
        let fill = RegionFill {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            color: self.ui.style.fill_color.clone(),
            pattern: self.ui.style.fill_pattern.clone(),
            tolerance: self.ui.style.fill_tolerance,
        };
        debug!(fill = %fill.id, x = fill.x, y = fill.y, "fill recorded");
        self.layers.fills.push(fill);
        self.composite_stale = true;
        actions.push(Action::FillsChanged(self.layers.fills.clone()));
        actions.push(Action::RenderNeeded);
    }

    // --- Gesture plumbing ---

    /// Resolve an in-flight gesture the way pointer-up would, except
    /// that a provisional measure line is abandoned rather than
    /// committed, and a pending placement is cancelled.
    fn finish_gesture(&mut self, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle
            | Gesture::MeasureDrag { .. }
            | Gesture::PendingPlacement { .. }
            | Gesture::EndpointDrag { .. }
            | Gesture::GraphicDrag { .. } => {}
            Gesture::Drawing { points } => {
                self.commit_stroke(points, actions);
            }
        }
    }

    /// Commit a captured polyline as a stroke. Fewer than two points is
    /// an accidental tap and records nothing.
    fn commit_stroke(&mut self, points: Vec<PercentPoint>, actions: &mut Vec<Action>) {
        if points.len() < 2 {
            return;
        }
        let stroke = Stroke {
            id: Uuid::new_v4(),
            points,
            color: self.ui.style.stroke_color.clone(),
            width: self.ui.style.stroke_width,
        };
        debug!(stroke = %stroke.id, points = stroke.points.len(), "stroke committed");
        self.layers.strokes.push(stroke);
        actions.push(Action::StrokesChanged(self.layers.strokes.clone()));
    }

    fn select(&mut self, selection: Option<Selection>, actions: &mut Vec<Action>) {
        if self.ui.selected != selection {
            self.ui.selected = selection;
            actions.push(Action::SelectionChanged(selection));
        }
    }

    fn drop_selection_of(&mut self, selection: Selection, actions: &mut Vec<Action>) {
        if self.ui.selected == Some(selection) {
            self.select(None, actions);
        }
    }
}
