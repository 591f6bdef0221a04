use std::sync::Arc;

use crate::credential::CredentialHasher;
use crate::observability::Metrics;
use crate::session::{SessionManager, SqlSessionStore};
use crate::storage::Database;
use crate::userdb::UserStore;

pub(super) struct Harness {
    pub(super) users: UserStore,
    pub(super) hasher: CredentialHasher,
    pub(super) sessions: SessionManager,
}

/// In-memory stores with the schema in place.
pub(super) async fn harness() -> Harness {
    let db = Database::in_memory(Metrics::new().unwrap()).unwrap();
    let users = UserStore::new(db.clone());
    users.init().await.unwrap();
    let session_store = SqlSessionStore::new(db);
    session_store.init().await.unwrap();
    Harness {
        users,
        hasher: CredentialHasher::new(),
        sessions: SessionManager::new(Arc::new(session_store)),
    }
}
