//! WeGene Assistant - MCP server exposing WeGene genetic test reports to AI assistants

pub mod config;
pub mod error;
pub mod types;

pub mod api;
pub mod catalog;
pub mod context;
pub mod mcp;
pub mod store;
pub mod tools;
pub mod wegene;

pub use config::Config;
pub use context::AppContext;
pub use error::{Error, Result};
pub use types::*;
