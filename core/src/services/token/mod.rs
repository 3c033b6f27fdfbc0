//! Token module for JWT management
//!
//! Signs and verifies access and refresh tokens. Tokens carry identity and
//! role only; session state lives in the session repository.

mod codec;
mod config;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use config::TokenCodecConfig;
