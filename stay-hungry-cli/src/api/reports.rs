//! Report endpoints behind the admin analytics and progress screens.
//!
//! Each screen fires its requests concurrently; a failed request shows as an
//! empty dataset instead of failing the whole screen.

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};

use super::{or_empty, ApiClient};
use crate::models::{
    AdherenceReport, AnalyticsData, BmiPoint, CaloriesRow, ChurnRow, PrRow, ProgressData,
    TrainerClientsReport, UsageSummary, VolumeRow, WeightPoint,
};

/// Inclusive date range used by the report endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Range ending today and spanning `days` back
    pub fn last_days(days: u32) -> Self {
        let to = Local::now().date_naive();
        Self {
            from: to - Duration::days(i64::from(days)),
            to,
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("from", self.from.to_string()), ("to", self.to.to_string())]
    }
}

impl ApiClient {
    pub async fn churn_report(&self, range: &DateRange) -> Result<Vec<ChurnRow>> {
        self.get_json("/api/reports/users/churn", &range.query(), "churn report")
            .await
    }

    pub async fn adherence_report(&self, days: u32) -> Result<AdherenceReport> {
        let query = [("days", days.to_string())];
        self.get_json("/api/reports/adherence", &query, "adherence report")
            .await
    }

    pub async fn volume_report(&self, range: &DateRange) -> Result<Vec<VolumeRow>> {
        let mut query = range.query();
        query.push(("groupBy", "week".to_string()));
        self.get_json("/api/reports/volume", &query, "volume report")
            .await
    }

    pub async fn prs_report(&self, range: &DateRange) -> Result<Vec<PrRow>> {
        self.get_json("/api/reports/prs", &range.query(), "PR report")
            .await
    }

    pub async fn trainer_clients_report(&self, range: &DateRange) -> Result<TrainerClientsReport> {
        self.get_json(
            "/api/reports/trainers/clients",
            &range.query(),
            "clients per trainer report",
        )
        .await
    }

    pub async fn usage_summary(&self, range: &DateRange) -> Result<UsageSummary> {
        self.get_json("/api/analytics/usage-summary", &range.query(), "usage summary")
            .await
    }

    /// Load every admin analytics dataset concurrently
    pub async fn analytics(&self, range: &DateRange) -> AnalyticsData {
        let (churn, adherence, volume, prs, trainer_clients, usage) = tokio::join!(
            self.churn_report(range),
            self.adherence_report(30),
            self.volume_report(range),
            self.prs_report(range),
            self.trainer_clients_report(range),
            self.usage_summary(range),
        );

        AnalyticsData {
            churn: or_empty(churn, "churn report"),
            adherence: or_empty(adherence.map(Some), "adherence report"),
            volume: or_empty(volume, "volume report"),
            prs: or_empty(prs, "PR report"),
            trainer_clients: or_empty(trainer_clients, "clients per trainer report"),
            usage: or_empty(usage.map(Some), "usage summary"),
        }
    }

    pub async fn weight_history(&self, usuario_id: i64, days: u32) -> Result<Vec<WeightPoint>> {
        self.get_json(
            "/api/progress/weight-history",
            &progress_query(usuario_id, days),
            "weight history",
        )
        .await
    }

    pub async fn bmi_history(&self, usuario_id: i64, days: u32) -> Result<Vec<BmiPoint>> {
        self.get_json(
            "/api/progress/bmi-history",
            &progress_query(usuario_id, days),
            "BMI history",
        )
        .await
    }

    pub async fn strength_prs(&self, usuario_id: i64, days: u32) -> Result<Vec<PrRow>> {
        self.get_json(
            "/api/progress/strength-prs",
            &progress_query(usuario_id, days),
            "strength PRs",
        )
        .await
    }

    pub async fn calories_by_session(
        &self,
        usuario_id: i64,
        range: &DateRange,
    ) -> Result<Vec<CaloriesRow>> {
        let mut query = vec![("usuarioId", usuario_id.to_string())];
        query.extend(range.query());
        self.get_json("/api/calories/by-session", &query, "calories by session")
            .await
    }

    /// Load every progress dataset for a user concurrently
    pub async fn progress(&self, usuario_id: i64, days: u32) -> ProgressData {
        let range = DateRange::last_days(days);
        let (weight, bmi, strength, calories) = tokio::join!(
            self.weight_history(usuario_id, days),
            self.bmi_history(usuario_id, days),
            self.strength_prs(usuario_id, days),
            self.calories_by_session(usuario_id, &range),
        );

        ProgressData {
            days,
            weight: or_empty(weight, "weight history"),
            bmi: or_empty(bmi, "BMI history"),
            strength: or_empty(strength, "strength PRs"),
            calories: or_empty(calories, "calories by session"),
        }
    }
}

fn progress_query(usuario_id: i64, days: u32) -> [(&'static str, String); 2] {
    [("usuarioId", usuario_id.to_string()), ("days", days.to_string())]
}
