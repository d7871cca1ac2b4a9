//! Shared numeric constants for the canvas crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for pin markers.
pub const PIN_RADIUS_PX: f64 = 12.0;

/// Screen-space hit slop in pixels for line endpoint handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Screen-space hit slop in pixels for a line body (label strip).
pub const LINE_BODY_RADIUS_PX: f64 = 6.0;

// ── Measurement lines ───────────────────────────────────────────

/// Minimum horizontal span, in percent of image width, below which a
/// measurement drag is treated as an accidental click and discarded.
pub const MEASURE_MIN_SPAN_PCT: f64 = 1.0;

// ── Placed graphics ─────────────────────────────────────────────

/// Width assigned to a freshly placed graphic, percent of image width.
pub const GRAPHIC_DEFAULT_WIDTH_PCT: f64 = 20.0;

/// Lower clamp for a placed graphic's width, percent of image width.
pub const GRAPHIC_MIN_WIDTH_PCT: f64 = 2.0;

/// Upper clamp for a placed graphic's width, percent of image width.
pub const GRAPHIC_MAX_WIDTH_PCT: f64 = 60.0;

// ── Strokes and fills ───────────────────────────────────────────

/// Default freehand stroke width, percent of image width.
pub const STROKE_DEFAULT_WIDTH_PCT: f64 = 0.6;

/// Default per-channel flood-fill tolerance (inclusive, 0–255 scale).
pub const FILL_DEFAULT_TOLERANCE: u8 = 30;
