use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::models::{NewSet, SetRow, TodaySession, TodaySummaryRow};

/// Trainer view of a client's session for today
#[derive(Debug, Clone)]
pub enum TodaySummary {
    /// No active routine or no session generated today
    NoSession,
    Rows(Vec<TodaySummaryRow>),
    /// The server answered with a message instead of rows
    Message(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Resumen {
    Rows(Vec<TodaySummaryRow>),
    Message(String),
}

#[derive(Deserialize)]
struct SummaryBody {
    resumen: Option<Resumen>,
}

#[derive(Serialize)]
struct Toggle {
    completado: bool,
}

impl ApiClient {
    pub async fn today_session(&self, cliente_id: i64) -> Result<TodaySession> {
        let query = [("clienteId", cliente_id.to_string())];
        self.get_json("/api/sessions/today", &query, "today's session")
            .await
    }

    pub async fn toggle_exercise(
        &self,
        sesion_id: i64,
        plantilla_ejercicio_id: i64,
        completado: bool,
    ) -> Result<()> {
        self.post_unit(
            &format!(
                "/api/sessions/{}/exercises/{}/toggle",
                sesion_id, plantilla_ejercicio_id
            ),
            &Toggle { completado },
            "exercise toggle",
        )
        .await
    }

    pub async fn sets(&self, sesion_id: i64, plantilla_ejercicio_id: i64) -> Result<Vec<SetRow>> {
        self.get_json(
            &format!(
                "/api/sessions/{}/exercises/{}/sets",
                sesion_id, plantilla_ejercicio_id
            ),
            &[],
            "set list",
        )
        .await
    }

    pub async fn log_set(&self, sesion_id: i64, set: &NewSet) -> Result<()> {
        tracing::debug!(
            "Logging set {} for item {}",
            set.set_num,
            set.plantilla_ejercicio_id
        );
        self.post_unit(&format!("/api/sessions/{}/sets", sesion_id), set, "set logging")
            .await
    }

    /// Today's per-exercise summary for one client
    pub async fn today_summary(&self, cliente_id: i64) -> Result<TodaySummary> {
        let today = self.today_session(cliente_id).await?;
        let Some(sesion_id) = today.sesion_id else {
            return Ok(TodaySummary::NoSession);
        };

        let body: SummaryBody = self
            .get_json(
                &format!("/api/sessions/{}/summary", sesion_id),
                &[],
                "session summary",
            )
            .await?;

        Ok(match body.resumen {
            Some(Resumen::Rows(rows)) => TodaySummary::Rows(rows),
            Some(Resumen::Message(message)) => TodaySummary::Message(message),
            None => TodaySummary::Rows(Vec::new()),
        })
    }
}
