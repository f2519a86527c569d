// Terminal UI module using ratatui

mod app;
mod dashboard;
mod widgets;

use anyhow::Result;

pub use app::{command_for, greeting, role_counts, Action, App, RoleCount};
pub use dashboard::Dashboard;

use crate::context::AppContext;
use crate::models::{Rol, UserProfile};

/// What the dashboard shows
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub user: UserProfile,
    /// Users per role, administrators only; `None` when not loaded
    pub counts: Option<Vec<RoleCount>>,
}

/// Fetch the profile and, for administrators, the user counts
pub async fn load(ctx: &AppContext) -> Result<DashboardData> {
    let user = ctx.api.profile().await?;

    let counts = if user.rol == Rol::Administrador {
        match ctx.api.users().await {
            Ok(users) => Some(role_counts(&users)),
            Err(e) => {
                tracing::warn!("User counts unavailable: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(DashboardData { user, counts })
}
