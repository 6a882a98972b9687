//! Floor-plan evaluation substrate: the ownership raster and the room graph derived from it.
//!
//! Both structures are rebuilt from a gene on every query site; neither keeps
//! incremental state between fitness evaluations.

pub mod graph;
pub mod raster;

mod grid;

pub use graph::{DistanceMap, RoomsGraph};
pub use raster::RoomMap;
