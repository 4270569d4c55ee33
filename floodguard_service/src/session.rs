/// Persisted operator session.
///
/// The signed-in operator is kept as a single JSON object in
/// `<dir>/<key>.json`. It is loaded at start-up and rewritten on every
/// login, update and logout. A missing file means nobody is signed in; a
/// file that fails to parse is removed and treated the same way.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::{self, Component};
use crate::model::RegistryError;

pub const DEFAULT_SESSION_KEY: &str = "floodguard_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial profile change. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
}

impl UserSession {
    fn merge(&mut self, update: SessionUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if update.organization.is_some() {
            self.organization = update.organization;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
    }
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session. Returns `None` when there is no file, the
    /// file cannot be read, or its contents are not a valid session.
    pub fn load(&self) -> Option<UserSession> {
        let path = self.path.display().to_string();
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                logging::warn(Component::Session, None, &format!("Cannot read {}: {}", path, e));
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                logging::warn(
                    Component::Session,
                    None,
                    &format!("Discarding corrupt session at {}: {}", path, e),
                );
                if let Err(remove_err) = fs::remove_file(&self.path) {
                    logging::warn(
                        Component::Session,
                        None,
                        &format!("Cannot remove {}: {}", path, remove_err),
                    );
                }
                None
            }
        }
    }

    /// Writes `session`, or removes the file when `None`.
    pub fn save(&self, session: Option<&UserSession>) -> Result<(), RegistryError> {
        let io_err = |source| RegistryError::Session {
            path: self.path.display().to_string(),
            source,
        };
        match session {
            Some(s) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent).map_err(io_err)?;
                }
                let json = serde_json::to_string_pretty(s)?;
                fs::write(&self.path, json).map_err(io_err)
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_err(e)),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Auth state
// ---------------------------------------------------------------------------

/// The active session plus the store it is persisted to.
pub struct AuthState {
    store: SessionStore,
    user: Option<UserSession>,
}

impl AuthState {
    /// Restores whatever session was persisted last.
    pub fn restore(store: SessionStore) -> Self {
        let user = store.load();
        if let Some(u) = &user {
            logging::info(Component::Session, Some(&u.email), "Session restored");
        }
        Self { store, user }
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, session: UserSession) -> Result<(), RegistryError> {
        self.store.save(Some(&session))?;
        logging::info(Component::Session, Some(&session.email), "Signed in");
        self.user = Some(session);
        Ok(())
    }

    /// Merges `update` into the active session. Returns `false` without
    /// touching storage when nobody is signed in.
    pub fn update(&mut self, update: SessionUpdate) -> Result<bool, RegistryError> {
        let Some(current) = &self.user else {
            return Ok(false);
        };
        let mut merged = current.clone();
        merged.merge(update);
        self.store.save(Some(&merged))?;
        self.user = Some(merged);
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<(), RegistryError> {
        self.store.save(None)?;
        if let Some(u) = self.user.take() {
            logging::info(Component::Session, Some(&u.email), "Signed out");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn coordinator() -> UserSession {
        UserSession {
            email: "amina@nema.gov.ng".to_string(),
            name: "Amina Hassan".to_string(),
            role: "coordinator".to_string(),
            organization: Some("NEMA".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_missing_file_means_no_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path(), DEFAULT_SESSION_KEY);
        assert!(store.load().is_none());
        assert!(!AuthState::restore(store).is_authenticated());
    }

    #[test]
    fn test_login_persists_and_restores() {
        let dir = tempdir().unwrap();
        let mut auth = AuthState::restore(SessionStore::new(dir.path(), DEFAULT_SESSION_KEY));
        auth.login(coordinator()).unwrap();

        assert!(dir.path().join("floodguard_user.json").exists());
        let restored = AuthState::restore(SessionStore::new(dir.path(), DEFAULT_SESSION_KEY));
        assert_eq!(restored.user(), Some(&coordinator()));
    }

    #[test]
    fn test_optional_fields_are_omitted_from_json() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path(), DEFAULT_SESSION_KEY);
        store.save(Some(&coordinator())).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"organization\""));
        assert!(!raw.contains("\"phone\""));
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let dir = tempdir().unwrap();
        let mut auth = AuthState::restore(SessionStore::new(dir.path(), DEFAULT_SESSION_KEY));
        auth.login(coordinator()).unwrap();

        let changed = auth
            .update(SessionUpdate {
                phone: Some("+234-817-123-4567".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(changed);
        let user = auth.user().unwrap();
        assert_eq!(user.phone.as_deref(), Some("+234-817-123-4567"));
        assert_eq!(user.organization.as_deref(), Some("NEMA"));
        assert_eq!(user.name, "Amina Hassan");

        let restored = SessionStore::new(dir.path(), DEFAULT_SESSION_KEY).load().unwrap();
        assert_eq!(restored.phone.as_deref(), Some("+234-817-123-4567"));
    }

    #[test]
    fn test_update_without_session_is_noop() {
        let dir = tempdir().unwrap();
        let mut auth = AuthState::restore(SessionStore::new(dir.path(), DEFAULT_SESSION_KEY));
        let changed = auth
            .update(SessionUpdate {
                name: Some("Nobody".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(!changed);
        assert!(auth.user().is_none());
        assert!(!dir.path().join("floodguard_user.json").exists());
    }

    #[test]
    fn test_logout_removes_file() {
        let dir = tempdir().unwrap();
        let mut auth = AuthState::restore(SessionStore::new(dir.path(), DEFAULT_SESSION_KEY));
        auth.login(coordinator()).unwrap();
        auth.logout().unwrap();

        assert!(!auth.is_authenticated());
        assert!(!dir.path().join("floodguard_user.json").exists());
        // Logging out twice is fine.
        auth.logout().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path(), DEFAULT_SESSION_KEY);
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_custom_key_changes_file_name() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path(), "ops_user");
        assert_eq!(store.path(), dir.path().join("ops_user.json"));
    }
}
