//! Annotation and region-fill canvas engine for garment tech packs.
//!
//! This crate is headless: it owns the full interaction lifecycle of one
//! sketch canvas — translating pointer events into layer mutations,
//! hit-testing entities, replaying flood fills over the decoded sketch,
//! and composing a typed display list — without touching a screen. The
//! host (a UI shell or the `stitchmark` CLI) feeds it pointer samples and
//! document snapshots and persists the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine: mode dispatch, gestures, actions |
//! | [`document`] | Tech-pack document: sides, layer lists, measurements |
//! | [`geometry`] | Percent/screen coordinate conversions |
//! | [`layers`] | Per-layer entity types and boundary validation |
//! | [`input`] | Modes, UI state, and the gesture state machine |
//! | [`hit`] | Hit-testing against pins, lines, and graphics |
//! | [`fill`] | Flood-fill compose pass over the decoded sketch |
//! | [`render`] | Display-list composition (layer order contract) |
//! | [`raster`] | tiny-skia flattening of display lists to PNG |
//! | [`source`] | Image references: data URI, bare base64, file path |
//! | [`consts`] | Shared numeric constants (hit radii, defaults) |

pub mod consts;
pub mod document;
pub mod engine;
pub mod fill;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod layers;
pub mod raster;
pub mod render;
pub mod source;
