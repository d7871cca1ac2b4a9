//! Tech-pack document model: named garment sides, their layer lists, and
//! the measurement lookup table.
//!
//! The document is the host's source of truth. The engine works on one
//! side's snapshot at a time; its whole-list actions are applied back
//! here via [`TechPack::apply`], which touches only the addressed side.
//! Data flows in from storage (JSON deserialization with boundary
//! validation) and from the engine (action application); the CLI reads
//! sides from here to validate and composite them.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::Action;
use crate::layers::{LayerError, MeasurementSpec, SideLayers};
use crate::source::ImageSource;

/// Failure while loading, saving, or addressing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no side named `{0}`")]
    UnknownSide(String),
    #[error("side `{side}`: {source}")]
    Invalid {
        side: String,
        #[source]
        source: LayerError,
    },
}

/// One garment view: its sketch image and annotation layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    /// The base sketch. Absent for sides with no upload yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    /// The five layer lists, flattened into the side record.
    #[serde(flatten)]
    pub layers: SideLayers,
}

/// A tech-pack document: named sides plus the measurement table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechPack {
    #[serde(default)]
    pub name: String,
    /// Sides keyed by view name (`front`, `back`, ...). Kept sorted so
    /// listings and serialized output are deterministic.
    #[serde(default)]
    pub sides: BTreeMap<String, SideState>,
    /// Known measurement codes for read-only label target display.
    #[serde(default)]
    pub measurements: Vec<MeasurementSpec>,
}

impl TechPack {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Parse a document, validate its boundary data, and repair soft
    /// drift (pin numbering gaps, graphic widths outside the slider
    /// range).
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] for malformed JSON and
    /// [`DocumentError::Invalid`] naming the offending side for layer
    /// data that violates the boundary rules.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let mut pack: TechPack = serde_json::from_str(raw)?;
        for (name, side) in &mut pack.sides {
            side.layers
                .validate()
                .map_err(|source| DocumentError::Invalid { side: name.clone(), source })?;
            side.layers.normalize();
        }
        debug!(name = %pack.name, sides = pack.sides.len(), "document loaded");
        Ok(pack)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a side by name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownSide`] when the name is absent.
    pub fn side(&self, name: &str) -> Result<&SideState, DocumentError> {
        self.sides.get(name).ok_or_else(|| DocumentError::UnknownSide(name.to_string()))
    }

    /// Look up a side by name for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownSide`] when the name is absent.
    pub fn side_mut(&mut self, name: &str) -> Result<&mut SideState, DocumentError> {
        self.sides.get_mut(name).ok_or_else(|| DocumentError::UnknownSide(name.to_string()))
    }

    /// Fetch a side, creating an empty one on first use.
    pub fn ensure_side(&mut self, name: &str) -> &mut SideState {
        self.sides.entry(name.to_string()).or_default()
    }

    /// Apply one engine action to the addressed side. List-carrying
    /// actions replace that side's list wholesale; display-only actions
    /// are ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownSide`] when the name is absent.
    pub fn apply(&mut self, side: &str, action: &Action) -> Result<(), DocumentError> {
        let state = self.side_mut(side)?;
        match action {
            Action::PinsChanged(pins) => state.layers.pins = pins.clone(),
            Action::StrokesChanged(strokes) => state.layers.strokes = strokes.clone(),
            Action::LinesChanged(lines) => state.layers.lines = lines.clone(),
            Action::GraphicsChanged(graphics) => state.layers.graphics = graphics.clone(),
            Action::FillsChanged(fills) => state.layers.fills = fills.clone(),
            Action::SelectionChanged(_)
            | Action::GraphicFileRequested { .. }
            | Action::ImageReplaceRequested
            | Action::RenderNeeded => {}
        }
        Ok(())
    }
}
