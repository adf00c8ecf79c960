//! Core services for the Gridle window tiler

pub mod layout;
pub mod matcher;
pub mod session;

pub use layout::*;
pub use matcher::*;
pub use session::*;
