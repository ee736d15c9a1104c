//! Spotify Web API catalog.
//!
//! [`SpotifyClient`] implements [`CatalogApi`](crate::services::catalog_api::CatalogApi)
//! using the client-credentials flow. Playlist pages are followed until the
//! whole track list is materialised.

mod client;
pub mod identifier;

pub use client::{API_BASE, SpotifyClient, TOKEN_URL};
