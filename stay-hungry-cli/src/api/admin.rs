use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Envelope};
use crate::models::{Rol, UserProfile};

/// Fields an administrator may change on another account
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserUpdate {
    pub nombre: String,
    pub rol: Rol,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    #[serde(default)]
    users: Vec<UserProfile>,
}

#[derive(Serialize)]
struct StatusUpdate {
    activo: u8,
}

impl ApiClient {
    /// All accounts, active and inactive
    pub async fn users(&self) -> Result<Vec<UserProfile>> {
        let query = [("include", "all".to_string())];
        let envelope: Envelope<UsersData> = self.get_json("/api/auth/users", &query, "users").await?;
        Ok(envelope.into_data("user listing")?.users)
    }

    pub async fn admin_update_user(&self, user_id: i64, update: &AdminUserUpdate) -> Result<()> {
        tracing::info!("Updating user {} ({}, {})", user_id, update.nombre, update.rol);
        self.put_unit(&format!("/api/auth/users/{}", user_id), update, "user update")
            .await
    }

    /// Activate or soft-delete an account
    pub async fn set_user_status(&self, user_id: i64, activo: bool) -> Result<()> {
        let body = StatusUpdate {
            activo: u8::from(activo),
        };
        tracing::info!("Setting user {} active={}", user_id, activo);
        self.put_unit(
            &format!("/api/auth/users/{}/status", user_id),
            &body,
            "user status",
        )
        .await
    }
}
