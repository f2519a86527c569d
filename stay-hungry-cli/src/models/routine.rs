use serde::{Deserialize, Serialize};

use super::lenient;

/// Exercise catalogue entry returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub grupo_muscular: Option<String>,
    #[serde(default)]
    pub dificultad: Option<String>,
}

/// Client row as listed for a trainer (my clients, search hits)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSummary {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub edad: Option<u32>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub peso: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub estatura: Option<f64>,
}

/// One ordered row of a routine template
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateItem {
    pub ejercicio_id: i64,
    pub orden: u32,
    pub series: u32,
    pub repeticiones: u32,
    pub peso_objetivo: Option<f64>,
}

/// Today's session for a client, built from the active template
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodaySession {
    #[serde(rename = "sesionId", default, deserialize_with = "lenient::i64_opt")]
    pub sesion_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default)]
    pub items: Vec<SessionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionItem {
    pub plantilla_ejercicio_id: i64,
    #[serde(default)]
    pub ejercicio_nombre: String,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub series: Option<u32>,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub repeticiones: Option<u32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completado: bool,
}

/// Logged set as listed by the API
#[derive(Debug, Clone, Deserialize)]
pub struct SetRow {
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub set_num: Option<u32>,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub reps: Option<u32>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub peso_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub rpe: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub es_max: bool,
}

/// Set payload sent when logging a new set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSet {
    pub plantilla_ejercicio_id: i64,
    pub set_num: u32,
    pub reps: u32,
    pub peso_kg: f64,
    pub rpe: Option<f64>,
    pub es_max: bool,
}

impl NewSet {
    /// Next set number given the sets already logged for the exercise
    pub fn next_set_num(logged: &[SetRow]) -> u32 {
        logged.len() as u32 + 1
    }
}

/// Per-exercise summary of a client's session, shown to trainers
#[derive(Debug, Clone, Deserialize)]
pub struct TodaySummaryRow {
    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub plantilla_ejercicio_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ejercicio: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub max_peso: Option<f64>,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub max_reps: Option<u32>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub est_1rm: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_session_without_routine() {
        let today: TodaySession =
            serde_json::from_str(r#"{"sesionId": null, "date": "2025-01-10"}"#).unwrap();
        assert!(today.sesion_id.is_none());
        assert!(today.items.is_empty());
    }

    #[test]
    fn test_new_set_wire_format() {
        let set = NewSet {
            plantilla_ejercicio_id: 12,
            set_num: 3,
            reps: 8,
            peso_kg: 62.5,
            rpe: None,
            es_max: false,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["plantillaEjercicioId"], 12);
        assert_eq!(json["setNum"], 3);
        assert_eq!(json["pesoKg"], 62.5);
        assert!(json["rpe"].is_null());
        assert_eq!(json["esMax"], false);
    }

    #[test]
    fn test_next_set_num() {
        let rows: Vec<SetRow> =
            serde_json::from_str(r#"[{"set_num": 1, "reps": 8, "peso_kg": "60.00", "es_max": 0}]"#)
                .unwrap();
        assert_eq!(NewSet::next_set_num(&rows), 2);
        assert_eq!(NewSet::next_set_num(&[]), 1);
    }
}
