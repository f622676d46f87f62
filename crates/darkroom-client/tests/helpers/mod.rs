//! Shared helpers for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use darkroom_client::models::Session;
use darkroom_client::{Config, DarkroomClient, MemorySessionStore};

/// Client over a mock server, backed by an observable in-memory store.
pub fn client_backed_by(
    url: &str,
    session: Option<Session>,
) -> (DarkroomClient, Arc<MemorySessionStore>) {
    let config = Config::with_api_url(url);
    let store = Arc::new(match session {
        Some(session) => MemorySessionStore::with_session(session),
        None => MemorySessionStore::new(),
    });
    let client =
        DarkroomClient::new(&config, Box::new(store.clone())).expect("failed to build client");
    (client, store)
}

/// An authenticated session with distinguishable tokens.
pub fn stale_session() -> Session {
    Session::new("stale-id-token", "refresh-1")
}
