//! Storage layer for the OAuth access token

mod token_store;

pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, TOKEN_TTL};
