//! Data models for the client stack
//!
//! Field names mirror the backend's JSON wire format (camelCase), organized
//! by domain. Each sub-module represents a specific feature area.

mod collection;
mod gallery;
mod order;
mod photo;
mod session;
mod sharing;
mod upload;

// Re-export all models for convenient imports
pub use collection::*;
pub use gallery::*;
pub use order::*;
pub use photo::*;
pub use session::*;
pub use sharing::*;
pub use upload::*;
