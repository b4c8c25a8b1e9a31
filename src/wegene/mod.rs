//! WeGene Open API access

mod client;

pub use client::{TokenResponse, WegeneClient};
