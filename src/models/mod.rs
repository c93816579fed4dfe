//! Data Models
//!
//! Shared data structures for the HTTP API, services and storage.

pub mod analysis;
pub mod response;
pub mod settings;

pub use analysis::*;
pub use response::*;
pub use settings::*;
