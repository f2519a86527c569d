use crossterm::event::KeyCode;

use crate::models::{BmiCategory, Rol, UserProfile};
use crate::router::{nav_items, Route};

/// Users per role, shown to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCount {
    pub rol: Rol,
    pub total: usize,
    pub activos: usize,
}

pub fn role_counts(users: &[UserProfile]) -> Vec<RoleCount> {
    Rol::ALL
        .iter()
        .map(|&rol| RoleCount {
            rol,
            total: users.iter().filter(|u| u.rol == rol).count(),
            activos: crate::models::active_count(users, rol),
        })
        .collect()
}

/// Greeting for the hour of the day (0-23)
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Buenos días",
        12..=17 => "Buenas tardes",
        _ => "Buenas noches",
    }
}

/// CLI command that opens a screen
pub fn command_for(route: Route) -> &'static str {
    match route {
        Route::Login => "stay-hungry login",
        Route::Register => "stay-hungry register",
        Route::Dashboard => "stay-hungry dashboard",
        Route::Profile => "stay-hungry profile show",
        Route::Users => "stay-hungry users list",
        Route::AdminAnalytics => "stay-hungry analytics",
        Route::TrainerClients => "stay-hungry clients list",
        Route::TrainerRoutines => "stay-hungry templates --help",
        Route::Routines => "stay-hungry routine today",
        Route::Progress => "stay-hungry progress",
    }
}

/// What the dashboard loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Refresh,
    Open(Route),
}

/// Application state for the TUI dashboard
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub user: UserProfile,
    pub greeting: &'static str,
    /// Present for administrators once loaded
    pub counts: Option<Vec<RoleCount>>,
    pub menu: Vec<Route>,
    pub selected_index: usize,
    pub status: String,
}

impl App {
    pub fn new(user: UserProfile, counts: Option<Vec<RoleCount>>, hour: u32) -> Self {
        let menu = nav_items(user.rol);
        Self {
            should_quit: false,
            show_help: false,
            greeting: greeting(hour),
            counts,
            menu,
            selected_index: 0,
            status: String::new(),
            user,
        }
    }

    pub fn bmi(&self) -> Option<(f64, BmiCategory)> {
        self.user.bmi().map(|bmi| (bmi, BmiCategory::from_bmi(bmi)))
    }

    pub fn selected_route(&self) -> Option<Route> {
        self.menu.get(self.selected_index).copied()
    }

    /// Replace data after a refresh
    pub fn reload(&mut self, user: UserProfile, counts: Option<Vec<RoleCount>>) {
        self.menu = nav_items(user.rol);
        self.selected_index = self.selected_index.min(self.menu.len().saturating_sub(1));
        self.user = user;
        self.counts = counts;
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return Action::None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') | KeyCode::Char('R') => return Action::Refresh,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_index + 1 < self.menu.len() {
                    self.selected_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(route) = self.selected_route() {
                    self.status = format!("{}: {}", route.title(), command_for(route));
                    return Action::Open(route);
                }
            }
            _ => {}
        }

        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(rol: Rol, activo: bool) -> UserProfile {
        UserProfile {
            id: 1,
            nombre: "Marta Gil".to_string(),
            email: "marta@gym.com".to_string(),
            rol,
            edad: Some(35),
            peso: Some(60.0),
            estatura: Some(1.65),
            fecha_registro: None,
            activo,
        }
    }

    #[test]
    fn test_greeting_by_hour() {
        assert_eq!(greeting(7), "Buenos días");
        assert_eq!(greeting(12), "Buenas tardes");
        assert_eq!(greeting(17), "Buenas tardes");
        assert_eq!(greeting(18), "Buenas noches");
        assert_eq!(greeting(0), "Buenos días");
    }

    #[test]
    fn test_role_counts() {
        let users = vec![
            user(Rol::Cliente, true),
            user(Rol::Cliente, false),
            user(Rol::Entrenador, true),
        ];
        let counts = role_counts(&users);

        assert_eq!(counts.len(), 3);
        let clientes = counts.iter().find(|c| c.rol == Rol::Cliente).unwrap();
        assert_eq!((clientes.total, clientes.activos), (2, 1));
        let admins = counts.iter().find(|c| c.rol == Rol::Administrador).unwrap();
        assert_eq!(admins.total, 0);
    }

    #[test]
    fn test_menu_navigation() {
        let mut app = App::new(user(Rol::Cliente, true), None, 9);
        assert_eq!(app.menu, nav_items(Rol::Cliente));
        assert_eq!(app.selected_route(), Some(Route::Dashboard));

        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected_index, 0);

        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.selected_route(), Some(Route::Progress));
        assert_eq!(app.handle_key(KeyCode::Enter), Action::Open(Route::Progress));
        assert!(app.status.contains("stay-hungry progress"));

        assert_eq!(app.handle_key(KeyCode::Char('r')), Action::Refresh);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = App::new(user(Rol::Entrenador, true), None, 20);
        app.handle_key(KeyCode::Char('?'));
        assert!(app.show_help);

        app.handle_key(KeyCode::Char('q'));
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn test_bmi_card() {
        let app = App::new(user(Rol::Cliente, true), None, 9);
        let (bmi, category) = app.bmi().unwrap();
        assert!((bmi - 22.04).abs() < 0.01);
        assert_eq!(category, BmiCategory::Normal);
    }
}
