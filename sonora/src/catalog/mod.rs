//! Catalog schema (artists, albums, tracks, playlists, purchases) and the aggregate
//! counts reported by the database health endpoint.

mod schema;
mod store;

pub use store::{CatalogStats, CatalogStore};
