//! Data models for the Gridle window tiler

pub mod grid;
pub mod layer;

pub use grid::*;
pub use layer::*;
