//! Session context shared by the API client, the navigator and the tracker.
//!
//! The current user and token live in a `watch` channel so observers can react
//! to login, logout and forced expiry without polling. Every mutation is
//! mirrored to local storage under the `token` and `user` keys.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::{Rol, UserProfile};
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};

/// Authenticated user plus bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
}

impl Session {
    pub fn rol(&self) -> Rol {
        self.user.rol
    }
}

/// Why the session last changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Restored,
    LoggedIn,
    Updated,
    LoggedOut,
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub change: SessionChange,
}

/// Injected session state with change notifications
#[derive(Clone)]
pub struct SessionContext {
    storage: Storage,
    state: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionContext {
    /// Restore the persisted session, if any.
    ///
    /// A session is restored only when both keys exist and the user record
    /// parses. A malformed record is removed and the context starts logged out.
    pub fn restore(storage: Storage) -> Result<Self> {
        let token = storage.get_item(TOKEN_KEY)?;
        let raw_user = storage.get_item(USER_KEY)?;

        let session = match (token, raw_user) {
            (Some(token), Some(raw_user)) if !token.is_empty() => {
                match serde_json::from_str::<UserProfile>(&raw_user) {
                    Ok(user) => Some(Session { user, token }),
                    Err(e) => {
                        tracing::warn!("Discarding unreadable stored user: {}", e);
                        storage.remove_item(TOKEN_KEY)?;
                        storage.remove_item(USER_KEY)?;
                        None
                    }
                }
            }
            _ => None,
        };

        if let Some(ref session) = session {
            tracing::debug!("Restored session for {}", session.user.email);
        }

        let (state, _) = watch::channel(SessionSnapshot {
            session,
            change: SessionChange::Restored,
        });

        Ok(Self {
            storage,
            state: Arc::new(state),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().session.as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().session.as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    /// Receive every subsequent change (the current value is marked seen)
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Start a session after a successful login or registration
    pub fn login(&self, user: UserProfile, token: String) -> Result<()> {
        let raw_user = serde_json::to_string(&user).context("Failed to serialize user")?;
        self.storage.set_item(TOKEN_KEY, &token)?;
        self.storage.set_item(USER_KEY, &raw_user)?;

        tracing::info!("Logged in as {} ({})", user.email, user.rol);

        self.state.send_replace(SessionSnapshot {
            session: Some(Session { user, token }),
            change: SessionChange::LoggedIn,
        });
        Ok(())
    }

    /// Replace the cached user record, keeping the token
    pub fn update_user(&self, user: UserProfile) -> Result<()> {
        let token = self.token().context("Not logged in")?;
        let raw_user = serde_json::to_string(&user).context("Failed to serialize user")?;
        self.storage.set_item(USER_KEY, &raw_user)?;

        self.state.send_replace(SessionSnapshot {
            session: Some(Session { user, token }),
            change: SessionChange::Updated,
        });
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;

        self.state.send_replace(SessionSnapshot {
            session: None,
            change: SessionChange::LoggedOut,
        });
        Ok(())
    }

    /// Drop the session after the server rejected its token.
    ///
    /// Returns `true` only for the call that actually cleared a session, so
    /// concurrent 401s produce a single forced logout.
    pub fn expire(&self) -> bool {
        let cleared = self.state.send_if_modified(|snapshot| {
            if snapshot.session.is_none() {
                return false;
            }
            snapshot.session = None;
            snapshot.change = SessionChange::Expired;
            true
        });

        if cleared {
            for key in [TOKEN_KEY, USER_KEY] {
                if let Err(e) = self.storage.remove_item(key) {
                    tracing::error!("Failed to clear '{}' after expiry: {:#}", key, e);
                }
            }
            tracing::warn!("Session expired, login required");
        }

        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user() -> UserProfile {
        UserProfile {
            id: 3,
            nombre: "Juan Cliente".to_string(),
            email: "juan.cliente@gmail.com".to_string(),
            rol: Rol::Cliente,
            edad: Some(25),
            peso: Some(75.0),
            estatura: Some(1.75),
            fecha_registro: None,
            activo: true,
        }
    }

    #[test]
    fn test_restore_without_data_is_logged_out() -> Result<()> {
        let dir = tempdir()?;
        let session = SessionContext::restore(Storage::open(dir.path())?)?;
        assert!(!session.is_authenticated());
        Ok(())
    }

    #[test]
    fn test_restore_malformed_user_clears_storage() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;
        storage.set_item(TOKEN_KEY, "tok")?;
        storage.set_item(USER_KEY, "{not json")?;

        let session = SessionContext::restore(storage.clone())?;
        assert!(!session.is_authenticated());
        assert_eq!(storage.get_item(TOKEN_KEY)?, None);
        assert_eq!(storage.get_item(USER_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_restore_requires_token_and_user() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;
        storage.set_item(USER_KEY, &serde_json::to_string(&user())?)?;

        let session = SessionContext::restore(storage)?;
        assert!(!session.is_authenticated());
        Ok(())
    }

    #[test]
    fn test_login_persists_and_restores() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;

        let session = SessionContext::restore(storage.clone())?;
        session.login(user(), "tok-1".to_string())?;
        assert_eq!(session.token(), Some("tok-1".to_string()));

        let restored = SessionContext::restore(storage)?;
        assert_eq!(restored.current(), session.current());
        Ok(())
    }

    #[test]
    fn test_update_user_keeps_token() -> Result<()> {
        let dir = tempdir()?;
        let session = SessionContext::restore(Storage::open(dir.path())?)?;
        assert!(session.update_user(user()).is_err());

        session.login(user(), "tok".to_string())?;
        let mut changed = user();
        changed.peso = Some(72.0);
        session.update_user(changed)?;

        assert_eq!(session.user().and_then(|u| u.peso), Some(72.0));
        assert_eq!(session.token(), Some("tok".to_string()));
        Ok(())
    }

    #[test]
    fn test_expire_clears_once_and_notifies() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;
        let session = SessionContext::restore(storage.clone())?;
        session.login(user(), "tok".to_string())?;

        let mut rx = session.subscribe();
        assert!(session.expire());
        assert!(!session.expire());

        assert!(rx.has_changed()?);
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.session.is_none());
        assert_eq!(snapshot.change, SessionChange::Expired);
        assert_eq!(storage.get_item(TOKEN_KEY)?, None);
        Ok(())
    }
}
