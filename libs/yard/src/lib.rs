//! Yard slot allocation and stacking-support validation.
//!
//! A yard is a `rows × columns × tiers` grid. A 20ft-class container covers one
//! column, anything longer covers two adjacent columns. This crate answers two
//! questions about a yard without touching any storage:
//!
//! - Where can a container of a given footprint go right now?
//!   ([`available_places`])
//! - Is this specific location physically legal? ([`LocationValidator`])
//!
//! Both work from a [`YardGrid`], an immutable occupancy view that callers
//! build fresh from their persisted location records on every request.
//!
//! # Invariants
//!
//! - Column spans are inclusive and 1-indexed; tier 1 is the ground.
//! - Two locations in the same row and tier never share a column.
//! - Nothing floats: a box above ground rests on one box that spans it, or a
//!   long box rests on two short boxes.
//! - Results are deterministic given the same inputs.

mod error;
mod footprint;
mod grid;
mod invariants;
mod placement;
mod search;
mod slot;
mod yard;

pub use error::{PlacementError, YardError};
pub use footprint::{ContainerFootprint, ContainerType};
pub use grid::YardGrid;
pub use invariants::{derive_column_end, LocationValidator, ProposedLocation};
pub use placement::{is_place_available, is_supported};
pub use search::available_places;
pub use slot::{AvailablePlace, ColumnSpan, OccupiedSlot, Slot};
pub use yard::YardDimensions;
