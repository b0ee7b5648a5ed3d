//! Domain types for the view-splitting pipeline.

pub mod region;

pub use region::{BBox, RawProposal, Region, ZoneFlags};
