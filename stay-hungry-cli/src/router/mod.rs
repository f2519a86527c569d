//! Role-gated navigation.
//!
//! Every screen has a route path. Which paths are reachable depends only on
//! the current session: logged-out users see the login and register screens,
//! logged-in users see the screens of their role.

use tokio::sync::watch;

use crate::models::Rol;
use crate::session::{Session, SessionChange, SessionContext, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Profile,
    Users,
    AdminAnalytics,
    TrainerClients,
    TrainerRoutines,
    Routines,
    Progress,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Profile,
        Route::Users,
        Route::AdminAnalytics,
        Route::TrainerClients,
        Route::TrainerRoutines,
        Route::Routines,
        Route::Progress,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::Users => "/users",
            Route::AdminAnalytics => "/admin-analytics",
            Route::TrainerClients => "/trainer/clients",
            Route::TrainerRoutines => "/trainer/routines",
            Route::Routines => "/routines",
            Route::Progress => "/progress",
        }
    }

    /// Parse a path, ignoring query string and trailing slash
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Menu label
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Iniciar sesión",
            Route::Register => "Registro",
            Route::Dashboard => "Dashboard",
            Route::Profile => "Perfil",
            Route::Users => "Usuarios",
            Route::AdminAnalytics => "Reportes",
            Route::TrainerClients => "Mis clientes",
            Route::TrainerRoutines => "Rutinas",
            Route::Routines => "Mi rutina",
            Route::Progress => "Progreso",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Routes reachable for a role, or for a logged-out user when `None`
pub fn permitted_routes(rol: Option<Rol>) -> Vec<Route> {
    let Some(rol) = rol else {
        return vec![Route::Register, Route::Login];
    };

    let mut routes = vec![Route::Dashboard, Route::Profile];
    routes.extend_from_slice(match rol {
        Rol::Administrador => &[Route::Users, Route::AdminAnalytics],
        Rol::Entrenador => &[Route::TrainerClients, Route::TrainerRoutines],
        Rol::Cliente => &[Route::Routines, Route::Progress],
    });
    routes
}

/// Where a logged-in or logged-out user lands when a path is not reachable
pub fn default_route(rol: Option<Rol>) -> Route {
    match rol {
        Some(_) => Route::Dashboard,
        None => Route::Login,
    }
}

/// Header menu for a role
pub fn nav_items(rol: Rol) -> Vec<Route> {
    permitted_routes(Some(rol))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    /// True when the requested path was replaced by the default route
    pub redirected: bool,
}

/// Resolve a requested path for the given session
pub fn resolve(path: &str, session: Option<&Session>) -> Resolution {
    let rol = session.map(Session::rol);
    let permitted = permitted_routes(rol);

    match Route::from_path(path) {
        Some(route) if permitted.contains(&route) => Resolution {
            route,
            redirected: false,
        },
        _ => Resolution {
            route: default_route(rol),
            redirected: true,
        },
    }
}

/// Current-route holder that follows the session.
///
/// An expired session sends the navigator to the login screen no matter
/// where it was.
pub struct Navigator {
    session: SessionContext,
    changes: watch::Receiver<SessionSnapshot>,
    current: Route,
}

impl Navigator {
    pub fn new(session: SessionContext) -> Self {
        let changes = session.subscribe();
        let current = default_route(session.current().map(|s| s.rol()));
        Self {
            session,
            changes,
            current,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Navigate to `path`, applying the role gate
    pub fn navigate(&mut self, path: &str) -> Resolution {
        self.sync();

        let resolution = resolve(path, self.session.current().as_ref());
        if resolution.redirected {
            tracing::debug!("{} not reachable, redirecting to {}", path, resolution.route);
        }
        self.current = resolution.route;
        resolution
    }

    /// Apply a pending session change. Returns the change when one was seen.
    pub fn sync(&mut self) -> Option<SessionChange> {
        if !self.changes.has_changed().unwrap_or(false) {
            return None;
        }

        let snapshot = self.changes.borrow_and_update().clone();
        let rol = snapshot.session.as_ref().map(Session::rol);

        self.current = match snapshot.change {
            SessionChange::Expired | SessionChange::LoggedOut => Route::Login,
            SessionChange::LoggedIn => Route::Dashboard,
            _ if permitted_routes(rol).contains(&self.current) => self.current,
            _ => default_route(rol),
        };

        Some(snapshot.change)
    }

    /// Whether the session expired since the last check; moves to login if so
    pub fn take_expired(&mut self) -> bool {
        matches!(self.sync(), Some(SessionChange::Expired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::storage::Storage;

    fn session(rol: Rol) -> Session {
        Session {
            user: UserProfile {
                id: 1,
                nombre: "Ana".to_string(),
                email: "ana@gym.com".to_string(),
                rol,
                edad: None,
                peso: None,
                estatura: None,
                fecha_registro: None,
                activo: true,
            },
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_route_path_parsing() {
        assert_eq!(Route::from_path("/trainer/clients/"), Some(Route::TrainerClients));
        assert_eq!(Route::from_path("/progress?days=30"), Some(Route::Progress));
        assert_eq!(Route::from_path("/nope"), None);
        assert_eq!(Route::from_path("/"), None);
    }

    #[test]
    fn test_logged_out_only_reaches_login_and_register() {
        assert_eq!(resolve("/register", None).route, Route::Register);
        assert!(!resolve("/login", None).redirected);

        let resolution = resolve("/dashboard", None);
        assert_eq!(resolution.route, Route::Login);
        assert!(resolution.redirected);
    }

    #[test]
    fn test_logged_in_leaves_auth_screens() {
        let admin = session(Rol::Administrador);
        assert_eq!(resolve("/login", Some(&admin)).route, Route::Dashboard);
        assert_eq!(resolve("/register", Some(&admin)).route, Route::Dashboard);
    }

    #[test]
    fn test_role_gating() {
        let admin = session(Rol::Administrador);
        let trainer = session(Rol::Entrenador);
        let client = session(Rol::Cliente);

        for route in Route::ALL {
            let path = route.path();
            let reachable = |s: &Session| !resolve(path, Some(s)).redirected;

            let expected_admin = matches!(
                route,
                Route::Dashboard | Route::Profile | Route::Users | Route::AdminAnalytics
            );
            let expected_trainer = matches!(
                route,
                Route::Dashboard | Route::Profile | Route::TrainerClients | Route::TrainerRoutines
            );
            let expected_client = matches!(
                route,
                Route::Dashboard | Route::Profile | Route::Routines | Route::Progress
            );

            assert_eq!(reachable(&admin), expected_admin, "admin {}", path);
            assert_eq!(reachable(&trainer), expected_trainer, "trainer {}", path);
            assert_eq!(reachable(&client), expected_client, "client {}", path);
        }

        assert_eq!(resolve("/users", Some(&client)).route, Route::Dashboard);
    }

    #[test]
    fn test_navigator_forced_to_login_on_expiry() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let context = SessionContext::restore(Storage::open(dir.path())?)?;
        let user = session(Rol::Cliente).user;
        context.login(user, "tok".to_string())?;

        let mut navigator = Navigator::new(context.clone());
        assert_eq!(navigator.current(), Route::Dashboard);
        assert_eq!(navigator.navigate("/progress").route, Route::Progress);

        context.expire();
        assert!(navigator.take_expired());
        assert_eq!(navigator.current(), Route::Login);
        assert!(!navigator.take_expired());
        Ok(())
    }
}
