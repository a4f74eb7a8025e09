//! HTTP request handlers organized by area
//!
//! Each submodule contains handlers for one part of the surface.

pub mod chat;
pub mod pages;
pub mod rules;
pub mod session;

// Re-export all handlers for use in router
pub use chat::*;
pub use pages::*;
pub use rules::*;
pub use session::*;
