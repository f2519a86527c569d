use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::router::{Navigator, Route};
use crate::session::{Session, SessionContext};
use crate::storage::Storage;
use crate::tracker::{HttpTransport, Tracker, TrackerHandle};

/// Everything a command needs: configuration, the restored session, the API
/// client, the navigator and the usage tracker
pub struct AppContext {
    pub config: Config,
    pub session: SessionContext,
    pub api: ApiClient,
    navigator: Navigator,
    tracker: Option<TrackerHandle>,
}

impl AppContext {
    /// Load config and storage and restore the persisted session
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        let storage = Storage::init()?;
        Self::with_parts(config, storage)
    }

    pub fn with_parts(config: Config, storage: Storage) -> Result<Self> {
        let session = SessionContext::restore(storage)?;
        let api = ApiClient::new(&config, session.clone())?;
        let navigator = Navigator::new(session.clone());

        Ok(Self {
            config,
            session,
            api,
            navigator,
            tracker: None,
        })
    }

    /// Enter a screen, applying the role gate. Returns the current session.
    pub async fn enter(&mut self, route: Route) -> Result<Session> {
        let resolution = self.navigator.navigate(route.path());
        let session = match self.session.current() {
            Some(session) if !resolution.redirected => session,
            Some(session) => bail!(
                "{} is not available for the {} role",
                route.path(),
                session.rol()
            ),
            None => bail!("Not logged in. Use 'stay-hungry login' to authenticate."),
        };

        self.track(route).await;
        Ok(session)
    }

    /// Record a page view, starting the tracker on first use
    pub async fn track(&mut self, route: Route) {
        if !self.config.tracker.enabled {
            return;
        }

        if self.tracker.is_none() {
            match self.start_tracker(route).await {
                Ok(handle) => self.tracker = Some(handle),
                Err(e) => {
                    tracing::debug!("Usage tracking unavailable: {:#}", e);
                    return;
                }
            }
        }

        if let Some(tracker) = &self.tracker {
            tracker.page_view(route).await;
        }
    }

    async fn start_tracker(&self, route: Route) -> Result<TrackerHandle> {
        let transport = HttpTransport::new(
            self.config.tracker.endpoint.clone(),
            std::time::Duration::from_secs(self.config.api.timeout_seconds),
        )?;
        let tracker = Tracker::new(
            self.session.storage(),
            Arc::new(transport),
            self.config.tracker.heartbeat_interval(),
        )?;

        Ok(TrackerHandle::follow(tracker, &self.session, route).await)
    }

    pub fn tracker(&self) -> Option<&TrackerHandle> {
        self.tracker.as_ref()
    }

    /// Whether a 401 ended the session during this command; true once
    pub fn session_expired(&mut self) -> bool {
        self.navigator.take_expired()
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.export.output_dir)
    }

    /// Stop the tracker, flushing the final unload event
    pub async fn finish(mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rol, UserProfile};

    fn context(dir: &Path) -> Result<AppContext> {
        let mut config = Config::default();
        config.tracker.enabled = false;
        AppContext::with_parts(config, Storage::open(dir)?)
    }

    #[tokio::test]
    async fn test_enter_requires_login() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut ctx = context(dir.path())?;

        let err = ctx.enter(Route::Dashboard).await.unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
        Ok(())
    }

    #[tokio::test]
    async fn test_enter_applies_role_gate() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut ctx = context(dir.path())?;
        let user = UserProfile {
            id: 5,
            nombre: "Eva".to_string(),
            email: "eva@gym.com".to_string(),
            rol: Rol::Entrenador,
            edad: None,
            peso: None,
            estatura: None,
            fecha_registro: None,
            activo: true,
        };
        ctx.session.login(user, "tok".to_string())?;

        assert!(ctx.enter(Route::TrainerClients).await.is_ok());
        assert_eq!(ctx.current_route(), Route::TrainerClients);

        let err = ctx.enter(Route::Users).await.unwrap_err();
        assert!(err.to_string().contains("Entrenador"));
        assert_eq!(ctx.current_route(), Route::Dashboard);
        Ok(())
    }
}
