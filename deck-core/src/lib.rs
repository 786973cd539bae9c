//! Card sheet layout planning.
//!
//! Given a template's slot geometry and an ordered catalog of card sets, the
//! planner decides which card goes into which slot of which page so that the
//! printed sheets, cut into `parity` bands and restacked, leave every set in
//! one ordered pile.

pub mod chunk;
pub mod error;
pub mod metadata;
pub mod model;
pub mod parity;
pub mod planner;

pub use error::ConfigurationError;
pub use metadata::{CardEntry, LayoutMetadata};
pub use model::{CardPos, CardRef, CardSet, Catalog, LayoutConfig, LayoutMode, Page, SlotGeometry};
pub use parity::{ParityCoord, ParityGroup, ParitySpace, annotate, parity_groups};
pub use planner::{Plan, SetGroup, plan, validate};
