//! Session persistence.
//!
//! The credential pair survives process restarts through a [`SessionStore`].
//! Stores are synchronous and local: the gateway reads them when
//! it starts and writes only on sign-in, refresh, and sign-out, so there is
//! no network activity behind this seam.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use darkroom_core::models::Session;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("failed to persist session: {0}")]
    Persist(#[source] io::Error),

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait SessionStore: Send + Sync {
    /// Returns the persisted session, or an unauthenticated one when nothing
    /// readable is stored.
    fn load(&self) -> Session;

    /// Persists the full credential pair atomically. A crash mid-save must
    /// never leave a mismatched pair behind.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Removes all persisted credentials.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn load(&self) -> Session {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        (**self).clear()
    }
}

/// JSON-on-disk store.
///
/// Writes go through a temp file in the destination directory followed by a
/// rename, so a concurrent reader observes either the old pair or the new
/// pair, never a torn write.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Session {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable session file"
                );
                Session::default()
            }),
            Err(_) => Session::default(),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(SessionStoreError::Persist)?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(SessionStoreError::Persist)?;
        serde_json::to_writer(&mut file, session)?;
        file.persist(&self.path)
            .map_err(|err| SessionStoreError::Persist(err.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionStoreError::Persist(err)),
        }
    }
}

/// In-memory store for tests and short-lived tooling.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        MemorySessionStore {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Session {
        self.session
            .lock()
            .expect("session store poisoned")
            .clone()
            .unwrap_or_default()
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.session.lock().expect("session store poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.session.lock().expect("session store poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_the_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        let session = Session::new("id-token", "refresh-token");
        store.save(&session).unwrap();
        assert_eq!(store.load(), session);

        store.clear().unwrap();
        assert_eq!(store.load(), Session::default());
    }

    #[test]
    fn missing_file_loads_as_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        assert!(!store.load().authenticated());
    }

    #[test]
    fn corrupt_file_loads_as_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{\"access_token\": tru").unwrap();
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load(), Session::default());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        store.save(&Session::new("a", "b")).unwrap();
        assert!(store.load().authenticated());
    }
}
