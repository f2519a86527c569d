use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::models::{ClientSummary, Exercise, TemplateItem};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub entrenador_id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
}

/// Assign a template to a client starting on `fecha_inicio`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineAssignment {
    pub plantilla_id: i64,
    pub entrenador_id: i64,
    pub cliente_id: i64,
    pub fecha_inicio: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientAssignment {
    entrenador_id: i64,
    cliente_id: i64,
}

#[derive(Debug, Deserialize)]
struct TemplateCreated {
    #[serde(rename = "plantillaId")]
    plantilla_id: Option<i64>,
    id: Option<i64>,
}

#[derive(Serialize)]
struct TemplateItems<'a> {
    items: &'a [TemplateItem],
}

impl ApiClient {
    pub async fn my_clients(&self, entrenador_id: i64) -> Result<Vec<ClientSummary>> {
        let query = [("entrenadorId", entrenador_id.to_string())];
        self.get_json("/api/trainers/my-clients", &query, "client list")
            .await
    }

    /// Search clients by name or email that have no trainer yet
    pub async fn search_unassigned_clients(&self, term: &str) -> Result<Vec<ClientSummary>> {
        let query = [
            ("q", term.to_string()),
            ("unassignedOnly", "1".to_string()),
        ];
        self.get_json("/api/trainers/search-clients", &query, "client search")
            .await
    }

    pub async fn assign_client(&self, entrenador_id: i64, cliente_id: i64) -> Result<()> {
        tracing::info!("Assigning client {} to trainer {}", cliente_id, entrenador_id);
        let body = ClientAssignment {
            entrenador_id,
            cliente_id,
        };
        self.post_unit("/api/trainers/assign-client", &body, "client assignment")
            .await
    }

    pub async fn search_exercises(&self, term: &str) -> Result<Vec<Exercise>> {
        let query = [("q", term.to_string())];
        self.get_json("/api/exercises/search", &query, "exercise search")
            .await
    }

    /// Create a template, returning its id
    pub async fn create_template(&self, template: &NewTemplate) -> Result<i64> {
        let created: TemplateCreated = self
            .post_json("/api/routines/templates", template, "template creation")
            .await?;

        let id = created
            .plantilla_id
            .or(created.id)
            .context("Server did not return the template id")?;

        tracing::info!("Created template {} ({})", id, template.nombre);
        Ok(id)
    }

    pub async fn save_template_items(&self, plantilla_id: i64, items: &[TemplateItem]) -> Result<()> {
        self.post_unit(
            &format!("/api/routines/templates/{}/exercises", plantilla_id),
            &TemplateItems { items },
            "template exercises",
        )
        .await
    }

    pub async fn assign_routine(&self, assignment: &RoutineAssignment) -> Result<()> {
        tracing::info!(
            "Assigning template {} to client {}",
            assignment.plantilla_id,
            assignment.cliente_id
        );
        self.post_unit("/api/routines/assign", assignment, "routine assignment")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_assignment_wire_format() {
        let assignment = RoutineAssignment {
            plantilla_id: 4,
            entrenador_id: 2,
            cliente_id: 9,
            fecha_inicio: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["plantillaId"], 4);
        assert_eq!(json["clienteId"], 9);
        assert_eq!(json["fechaInicio"], "2025-03-01");
    }

    #[test]
    fn test_template_created_accepts_either_id() {
        let a: TemplateCreated = serde_json::from_str(r#"{"plantillaId": 7}"#).unwrap();
        let b: TemplateCreated = serde_json::from_str(r#"{"id": 8}"#).unwrap();
        assert_eq!(a.plantilla_id.or(a.id), Some(7));
        assert_eq!(b.plantilla_id.or(b.id), Some(8));
    }
}
