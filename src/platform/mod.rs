//! Platform integration layer for Gridle
//!
//! These modules define the OS-automation collaborators Gridle relies on:
//! monitor enumeration and window enumeration/manipulation. The traits keep
//! the platform boundary explicit so the layout and matching services can be
//! driven by in-memory implementations in tests, while concrete system
//! providers talk to the desktop underneath.

pub mod display;
pub mod window;

pub use display::*;
pub use window::*;
