//! Read-only report projections fetched per screen.

use serde::Deserialize;

use super::lenient;
use super::user::BmiCategory;

/// Sign-ups and cancellations per period
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawChurnRow")]
pub struct ChurnRow {
    pub periodo: String,
    pub altas: f64,
    pub bajas: f64,
    pub neto: Option<f64>,
}

/// The period label arrives as `mes`, `periodo` or `month`, sometimes several
/// at once; the first non-empty one wins in that order
#[derive(Deserialize)]
struct RawChurnRow {
    #[serde(default, deserialize_with = "lenient::text")]
    mes: String,
    #[serde(default, deserialize_with = "lenient::text")]
    periodo: String,
    #[serde(default, deserialize_with = "lenient::text")]
    month: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    altas: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    bajas: f64,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    neto: Option<f64>,
}

impl From<RawChurnRow> for ChurnRow {
    fn from(raw: RawChurnRow) -> Self {
        let periodo = [raw.mes, raw.periodo, raw.month]
            .into_iter()
            .find(|label| !label.is_empty())
            .unwrap_or_default();

        Self {
            periodo,
            altas: raw.altas,
            bajas: raw.bajas,
            neto: raw.neto,
        }
    }
}

impl ChurnRow {
    pub fn net(&self) -> f64 {
        match self.neto {
            Some(neto) if neto != 0.0 => neto,
            _ => self.altas - self.bajas,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdherenceReport {
    #[serde(default)]
    pub overall: AdherenceStats,
    #[serde(default)]
    pub by_trainer: Vec<TrainerAdherence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdherenceStats {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub clientes_con_sets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub total_clientes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub adherencia_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerAdherence {
    #[serde(default, alias = "nombre", deserialize_with = "lenient::text")]
    pub entrenador: String,
    #[serde(flatten)]
    pub stats: AdherenceStats,
}

/// Total training load per ISO week
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeRow {
    #[serde(default, alias = "week", deserialize_with = "lenient::text")]
    pub iso_week: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub carga_total: f64,
}

/// Personal record (estimated 1RM) per exercise
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrRow {
    #[serde(default, alias = "fecha", deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ejercicio: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub est_1rm: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub max_peso: Option<f64>,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub max_reps: Option<u32>,
    #[serde(default, alias = "cliente", deserialize_with = "lenient::text")]
    pub usuario: String,
}

impl PrRow {
    /// Best set as `peso x reps`, when both are known
    pub fn best_set(&self) -> Option<String> {
        match (self.max_peso, self.max_reps) {
            (Some(peso), Some(reps)) => Some(format!("{} x {}", peso, reps)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerClientsReport {
    #[serde(default)]
    pub rows: Vec<TrainerClientsRow>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub sin_asignar: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerClientsRow {
    #[serde(default, alias = "nombre", deserialize_with = "lenient::text")]
    pub entrenador: String,
    #[serde(default, alias = "count", deserialize_with = "lenient::f64_or_zero")]
    pub clientes: f64,
}

/// App usage collected by the tracker, aggregated server-side
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageSummary {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub sessions: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub minutes_active: f64,
    #[serde(default)]
    pub pages: Vec<PageUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageUsage {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub hits: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub users: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightPoint {
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BmiPoint {
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub bmi: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub peso_kg: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaloriesRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub minutos: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub met_prom: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub peso_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub kcal: Option<f64>,
    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub sesion_id: Option<i64>,
}

/// Everything the admin analytics screen shows
#[derive(Debug, Clone, Default)]
pub struct AnalyticsData {
    pub churn: Vec<ChurnRow>,
    pub adherence: Option<AdherenceReport>,
    pub volume: Vec<VolumeRow>,
    pub prs: Vec<PrRow>,
    pub trainer_clients: TrainerClientsReport,
    pub usage: Option<UsageSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsKpis {
    pub altas: f64,
    pub bajas: f64,
    pub carga_total: f64,
    pub adherencia_pct: Option<f64>,
    pub prs: usize,
    pub page_views: f64,
    pub minutes_active: f64,
}

impl AnalyticsKpis {
    pub fn compute(data: &AnalyticsData) -> Self {
        Self {
            altas: data.churn.iter().map(|r| r.altas).sum(),
            bajas: data.churn.iter().map(|r| r.bajas).sum(),
            carga_total: data.volume.iter().map(|r| r.carga_total).sum(),
            adherencia_pct: data
                .adherence
                .as_ref()
                .and_then(|a| a.overall.adherencia_pct),
            prs: data.prs.len(),
            page_views: data
                .usage
                .as_ref()
                .map(|u| u.pages.iter().map(|p| p.hits).sum())
                .unwrap_or(0.0),
            minutes_active: data.usage.as_ref().map(|u| u.minutes_active).unwrap_or(0.0),
        }
    }
}

/// Everything the client progress screen shows
#[derive(Debug, Clone, Default)]
pub struct ProgressData {
    pub days: u32,
    pub weight: Vec<WeightPoint>,
    pub bmi: Vec<BmiPoint>,
    pub strength: Vec<PrRow>,
    pub calories: Vec<CaloriesRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressKpis {
    pub last_weight: Option<f64>,
    pub last_date: Option<String>,
    pub previous_weight: Option<f64>,
    pub delta_kg: Option<f64>,
    pub delta_pct: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub bmi_date: Option<String>,
    pub total_kcal: f64,
    pub avg_kcal: f64,
}

impl ProgressKpis {
    pub fn compute(data: &ProgressData) -> Self {
        let mut kpis = Self::default();

        if let Some(last) = data.weight.last() {
            kpis.last_weight = last.weight;
            kpis.last_date = Some(last.date.clone());

            let previous = data
                .weight
                .len()
                .checked_sub(2)
                .and_then(|i| data.weight.get(i))
                .and_then(|p| p.weight);
            kpis.previous_weight = previous;

            if let (Some(last), Some(prev)) = (last.weight, previous) {
                kpis.delta_kg = Some(round2(last - prev));
                if prev != 0.0 {
                    kpis.delta_pct = Some(round2((last - prev) / prev * 100.0));
                }
            }
        }

        if let Some(point) = data.bmi.last() {
            kpis.bmi = point.bmi;
            kpis.bmi_category = point.bmi.map(BmiCategory::from_bmi);
            kpis.bmi_date = Some(point.date.clone());
        }

        kpis.total_kcal = data.calories.iter().filter_map(|r| r.kcal).sum();
        if !data.calories.is_empty() {
            kpis.avg_kcal = (kpis.total_kcal / data.calories.len() as f64).round();
        }

        kpis
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_churn_aliases_and_net() {
        let rows: Vec<ChurnRow> = serde_json::from_str(
            r#"[{"mes": "2025-01", "altas": "5", "bajas": 2},
                {"periodo": "2025-02", "altas": 3, "bajas": 1, "neto": 2}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].periodo, "2025-01");
        assert_eq!(rows[0].net(), 3.0);
        assert_eq!(rows[1].net(), 2.0);
    }

    #[test]
    fn test_churn_period_prefers_mes_when_several_present() {
        let rows: Vec<ChurnRow> = serde_json::from_str(
            r#"[{"mes": "2025-03", "periodo": "T1", "month": "March", "altas": 1, "bajas": 0},
                {"mes": "", "periodo": "T2", "month": "June", "altas": 2, "bajas": 1},
                {"month": "July", "altas": 0, "bajas": 1}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].periodo, "2025-03");
        assert_eq!(rows[1].periodo, "T2");
        assert_eq!(rows[2].periodo, "July");
    }

    #[test]
    fn test_analytics_kpis() {
        let data = AnalyticsData {
            churn: vec![
                ChurnRow { periodo: "a".into(), altas: 4.0, bajas: 1.0, neto: None },
                ChurnRow { periodo: "b".into(), altas: 2.0, bajas: 3.0, neto: None },
            ],
            volume: vec![VolumeRow { iso_week: "2025-W01".into(), carga_total: 1200.5 }],
            usage: Some(UsageSummary {
                sessions: 3.0,
                minutes_active: 42.0,
                pages: vec![
                    PageUsage { path: Some("/dashboard".into()), hits: 10.0, users: 2.0 },
                    PageUsage { path: None, hits: 5.0, users: 1.0 },
                ],
            }),
            ..Default::default()
        };

        let kpis = AnalyticsKpis::compute(&data);
        assert_eq!(kpis.altas, 6.0);
        assert_eq!(kpis.bajas, 4.0);
        assert_eq!(kpis.carga_total, 1200.5);
        assert_eq!(kpis.adherencia_pct, None);
        assert_eq!(kpis.prs, 0);
        assert_eq!(kpis.page_views, 15.0);
        assert_eq!(kpis.minutes_active, 42.0);
    }

    #[test]
    fn test_progress_kpis() {
        let data = ProgressData {
            days: 180,
            weight: vec![
                WeightPoint { date: "2025-01-01".into(), weight: Some(80.0) },
                WeightPoint { date: "2025-02-01".into(), weight: Some(78.0) },
            ],
            bmi: vec![BmiPoint { date: "2025-02-01".into(), bmi: Some(24.2), peso_kg: Some(78.0) }],
            strength: vec![],
            calories: vec![
                CaloriesRow { kcal: Some(300.0), ..Default::default() },
                CaloriesRow { kcal: Some(451.0), ..Default::default() },
            ],
        };

        let kpis = ProgressKpis::compute(&data);
        assert_eq!(kpis.last_weight, Some(78.0));
        assert_eq!(kpis.previous_weight, Some(80.0));
        assert_eq!(kpis.delta_kg, Some(-2.0));
        assert_eq!(kpis.delta_pct, Some(-2.5));
        assert_eq!(kpis.bmi_category, Some(BmiCategory::Normal));
        assert_eq!(kpis.total_kcal, 751.0);
        assert_eq!(kpis.avg_kcal, 376.0);
    }

    #[test]
    fn test_progress_kpis_empty() {
        let kpis = ProgressKpis::compute(&ProgressData::default());
        assert_eq!(kpis, ProgressKpis::default());
    }
}
