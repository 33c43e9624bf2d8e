//! Minimal Gemini client
//!
//! Covers the one endpoint the extractor needs, `models/{model}:generateContent`,
//! including JSON response schemas.

mod client;
mod http;
mod models;
mod types;

pub use client::Client;
pub use models::ModelsService;

pub mod prelude {
    pub use super::types::*;
    pub use crate::error::{Error, Result};
}
