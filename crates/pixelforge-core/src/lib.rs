//! pixelforge core - shared types for the pixelforge crates
//!
//! - `ForgeError` and the `Result` alias
//! - `ContentHash` - SHA-256 hashing of written artifacts

mod error;
mod hash;

pub use error::{ForgeError, Result};
pub use hash::ContentHash;
