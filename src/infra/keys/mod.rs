//! Catalog API credentials.
//!
//! [`SpotifyCredentials`] holds the client-credentials pair, loaded from the
//! environment (optionally seeded by a `.env` file) or a JSON secrets file.

mod config;

pub use config::{CLIENT_ID_VAR, CLIENT_SECRET_VAR, SpotifyCredentials};
