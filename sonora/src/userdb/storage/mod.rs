mod postgres;
mod sqlite;
mod store_type;

pub use store_type::UserStore;

/// Columns of the public [`User`](super::User) projection, in select order.
const USER_COLUMNS: &str = "id, email, username, display_name, avatar_url, bio, wallet_address, is_verified, google_id, created_at, updated_at";
