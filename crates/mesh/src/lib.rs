//! Mesh layouts and neighbour-coupled graphs for response-matrix solvers
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod cell;
mod error;
mod geometry;
mod graph;
mod layout;
mod particle;
mod topology;

// inline the important types for a nice public API
#[doc(inline)]
pub use cell::{CellId, MeshCell, Neighbour};

#[doc(inline)]
pub use geometry::Geometry;

#[doc(inline)]
pub use graph::{MeshGraph, MAX_NEIGHBOURS};

#[doc(inline)]
pub use layout::MeshLayout;

#[doc(inline)]
pub use particle::Particle;

#[doc(inline)]
pub use topology::{Offset, StructuredTopology, Topology};

#[doc(inline)]
pub use error::{Error, Result};
