use crate::storage::Database;

/// Column types that differ between the supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    fn timestamp(self) -> &'static str {
        match self {
            Dialect::Sqlite => "TIMESTAMP",
            Dialect::Postgres => "TIMESTAMPTZ",
        }
    }

    fn json(self) -> &'static str {
        match self {
            Dialect::Sqlite => "TEXT",
            Dialect::Postgres => "JSONB",
        }
    }

    fn now(self) -> &'static str {
        match self {
            Dialect::Sqlite => "CURRENT_TIMESTAMP",
            Dialect::Postgres => "NOW()",
        }
    }
}

/// Logical names of the catalog tables, in creation order.
pub(super) const CATALOG_TABLES: [&str; 7] = [
    "artists",
    "albums",
    "tracks",
    "playlists",
    "playlist_tracks",
    "user_favorites",
    "purchases",
];

/// `CREATE TABLE IF NOT EXISTS` statements for the catalog, parents before children.
/// The users table must already exist.
pub(super) fn create_statements(db: &Database, dialect: Dialect) -> Vec<String> {
    let users = db.table("users");
    let artists = db.table("artists");
    let albums = db.table("albums");
    let tracks = db.table("tracks");
    let playlists = db.table("playlists");
    let playlist_tracks = db.table("playlist_tracks");
    let user_favorites = db.table("user_favorites");
    let purchases = db.table("purchases");

    let ts = dialect.timestamp();
    let json = dialect.json();
    let now = dialect.now();

    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {artists} (
                id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL REFERENCES {users}(id),
                stage_name VARCHAR(100) NOT NULL,
                genre VARCHAR(50),
                description TEXT,
                social_links {json},
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at {ts} NOT NULL DEFAULT {now},
                updated_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {albums} (
                id TEXT PRIMARY KEY NOT NULL,
                artist_id TEXT NOT NULL REFERENCES {artists}(id),
                title VARCHAR(200) NOT NULL,
                description TEXT,
                cover_image_url TEXT,
                release_date {ts},
                price INTEGER,
                is_published BOOLEAN NOT NULL DEFAULT FALSE,
                metadata {json},
                created_at {ts} NOT NULL DEFAULT {now},
                updated_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {tracks} (
                id TEXT PRIMARY KEY NOT NULL,
                album_id TEXT REFERENCES {albums}(id),
                artist_id TEXT NOT NULL REFERENCES {artists}(id),
                title VARCHAR(200) NOT NULL,
                duration INTEGER,
                audio_url TEXT,
                lyrics TEXT,
                track_number INTEGER,
                genre VARCHAR(50),
                price INTEGER,
                is_published BOOLEAN NOT NULL DEFAULT FALSE,
                play_count INTEGER NOT NULL DEFAULT 0,
                metadata {json},
                created_at {ts} NOT NULL DEFAULT {now},
                updated_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {playlists} (
                id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL REFERENCES {users}(id),
                name VARCHAR(100) NOT NULL,
                description TEXT,
                cover_image_url TEXT,
                is_public BOOLEAN NOT NULL DEFAULT TRUE,
                created_at {ts} NOT NULL DEFAULT {now},
                updated_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {playlist_tracks} (
                id TEXT PRIMARY KEY NOT NULL,
                playlist_id TEXT NOT NULL REFERENCES {playlists}(id),
                track_id TEXT NOT NULL REFERENCES {tracks}(id),
                position INTEGER NOT NULL,
                added_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {user_favorites} (
                id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL REFERENCES {users}(id),
                track_id TEXT NOT NULL REFERENCES {tracks}(id),
                created_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {purchases} (
                id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL REFERENCES {users}(id),
                track_id TEXT REFERENCES {tracks}(id),
                album_id TEXT REFERENCES {albums}(id),
                price INTEGER NOT NULL,
                currency VARCHAR(10) NOT NULL DEFAULT 'USD',
                transaction_hash VARCHAR(100),
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                created_at {ts} NOT NULL DEFAULT {now}
            )
            "#
        ),
    ]
}
