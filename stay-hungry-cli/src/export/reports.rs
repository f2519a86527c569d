use chrono::NaiveDate;

use super::{iso, Record, Sheet};
use crate::api::DateRange;
use crate::models::report::round2;
use crate::models::{
    AnalyticsData, BmiCategory, ProgressData, ProgressKpis, Rol, UserProfile, WeightPoint,
};
use crate::record;

pub fn admin_filename(range: &DateRange) -> String {
    format!("reportes_admin_{}_a_{}.xlsx", iso(range.from), iso(range.to))
}

/// Sheets of the admin analytics workbook
pub fn admin_sheets(data: &AnalyticsData) -> Vec<Sheet> {
    let churn = data
        .churn
        .iter()
        .map(|r| {
            record! {
                "Periodo" => r.periodo.as_str(),
                "Altas" => r.altas,
                "Bajas" => r.bajas,
                "Neto" => r.net(),
            }
        })
        .collect();

    let mut adherence: Vec<Record> = Vec::new();
    let overall = data.adherence.as_ref().map(|a| &a.overall);
    adherence.push(record! {
        "clientes_con_sets" => overall.and_then(|o| o.clientes_con_sets),
        "total_clientes" => overall.and_then(|o| o.total_clientes),
        "adherencia_pct" => overall.and_then(|o| o.adherencia_pct),
    });
    adherence.push(Vec::new());
    for trainer in data.adherence.iter().flat_map(|a| &a.by_trainer) {
        adherence.push(record! {
            "Entrenador" => trainer.entrenador.as_str(),
            "Clientes_con_sets" => trainer.stats.clientes_con_sets,
            "Total_clientes" => trainer.stats.total_clientes,
            "Adherencia_%" => trainer.stats.adherencia_pct,
        });
    }

    let volume = data
        .volume
        .iter()
        .map(|r| {
            record! {
                "Semana" => r.iso_week.as_str(),
                "Carga_total" => r.carga_total,
            }
        })
        .collect();

    let prs = data
        .prs
        .iter()
        .map(|p| {
            record! {
                "Fecha" => p.date.as_str(),
                "Ejercicio" => p.ejercicio.as_str(),
                "1RM_est_kg" => p.est_1rm.map(round2),
                "Mejor_set" => p.best_set(),
                "Usuario" => p.usuario.as_str(),
            }
        })
        .collect();

    let mut trainer_clients: Vec<Record> = data
        .trainer_clients
        .rows
        .iter()
        .map(|r| {
            record! {
                "Entrenador" => r.entrenador.as_str(),
                "Clientes" => r.clientes,
            }
        })
        .collect();
    trainer_clients.push(Vec::new());
    trainer_clients.push(record! { "Sin_asignar" => data.trainer_clients.sin_asignar });

    let usage = data.usage.clone().unwrap_or_default();
    let mut usage_rows: Vec<Record> = vec![
        record! { "Metric" => "Sesiones únicas", "Valor" => usage.sessions },
        record! { "Metric" => "Minutos activos", "Valor" => usage.minutes_active },
        Vec::new(),
        record! { "Ruta" => "Ruta", "Pageviews" => "Pageviews", "Usuarios" => "Usuarios" },
    ];
    usage_rows.extend(usage.pages.iter().map(|p| {
        record! {
            "Ruta" => p.path.as_deref().unwrap_or("(sin ruta)"),
            "Pageviews" => p.hits,
            "Usuarios" => p.users,
        }
    }));

    vec![
        Sheet::from_records("Altas_Bajas", churn),
        Sheet::from_records("Adherencia", adherence),
        Sheet::from_records("Carga_Semanal", volume),
        Sheet::from_records("PRs", prs),
        Sheet::from_records("Clientes_x_Entrenador", trainer_clients),
        Sheet::from_records("Uso_App", usage_rows),
    ]
}

pub fn progress_filename(user_id: i64, today: NaiveDate) -> String {
    format!("progreso_{}_{}.xlsx", user_id, iso(today))
}

/// Sheets of a client's progress workbook
pub fn progress_sheets(data: &ProgressData, kpis: &ProgressKpis) -> Vec<Sheet> {
    let weight = data
        .weight
        .iter()
        .map(|w| record! { "Fecha" => w.date.as_str(), "Peso_kg" => w.weight })
        .collect();

    let summary = vec![record! {
        "Rango_dias" => data.days,
        "Ultimo_peso_kg" => kpis.last_weight,
        "Fecha_ultimo" => kpis.last_date.clone(),
        "Peso_prev_kg" => kpis.previous_weight,
        "Cambio_kg_vs_prev" => kpis.delta_kg,
        "Cambio_pct_vs_prev" => kpis.delta_pct,
        "IMC_actual" => kpis.bmi,
        "Categoria_IMC" => kpis.bmi_category.map(|c| c.to_string()),
        "Fecha_IMC" => kpis.bmi_date.clone(),
    }];

    let bmi = data
        .bmi
        .iter()
        .map(|b| {
            record! {
                "Fecha" => b.date.as_str(),
                "IMC" => b.bmi,
                "Peso_kg" => b.peso_kg,
            }
        })
        .collect();

    let strength = data
        .strength
        .iter()
        .map(|p| {
            record! {
                "Ejercicio" => p.ejercicio.as_str(),
                "1RM_estimado_kg" => p.est_1rm,
                "Mejor_peso_kg" => p.max_peso,
                "Mejor_reps" => p.max_reps,
                "Fecha" => p.date.as_str(),
            }
        })
        .collect();

    let calories = data
        .calories
        .iter()
        .map(|c| {
            record! {
                "Fecha" => c.date.as_str(),
                "Minutos" => c.minutos,
                "MET_prom" => c.met_prom,
                "Peso_kg" => c.peso_kg,
                "Kcal" => c.kcal,
            }
        })
        .collect();

    vec![
        Sheet::with_columns("Peso", &["Fecha", "Peso_kg"], weight),
        Sheet::from_records("KPIs", summary),
        Sheet::with_columns("IMC", &["Fecha", "IMC", "Peso_kg"], bmi),
        Sheet::with_columns(
            "1RM",
            &["Ejercicio", "1RM_estimado_kg", "Mejor_peso_kg", "Mejor_reps", "Fecha"],
            strength,
        ),
        Sheet::with_columns(
            "Calorias_Sesion",
            &["Fecha", "Minutos", "MET_prom", "Peso_kg", "Kcal"],
            calories,
        ),
    ]
}

pub fn users_filename(today: NaiveDate) -> String {
    format!("usuarios_{}.xlsx", iso(today))
}

const USER_COLUMN_WIDTHS: [f64; 11] = [6.0, 26.0, 30.0, 14.0, 6.0, 8.0, 10.0, 8.0, 14.0, 6.0, 16.0];

fn user_record(user: &UserProfile) -> Record {
    let bmi = user.bmi();
    record! {
        "ID" => user.id,
        "Nombre" => user.nombre.as_str(),
        "Email" => user.email.as_str(),
        "Rol" => user.rol.to_string(),
        "Edad" => user.edad,
        "Peso_kg" => user.peso,
        "Estatura_m" => user.estatura,
        "IMC" => bmi,
        "Categoria_IMC" => bmi.map(|b| BmiCategory::from_bmi(b).to_string()),
        "Activo" => if user.activo { "Sí" } else { "No" },
        "Miembro_desde" => user.member_since(),
    }
}

/// One sheet with every user, then one per role
pub fn users_sheets(users: &[UserProfile]) -> Vec<Sheet> {
    let sheet = |name: &str, rol: Option<Rol>| {
        let records = users
            .iter()
            .filter(|u| rol.map_or(true, |r| u.rol == r))
            .map(user_record)
            .collect();
        Sheet::from_records(name, records).column_widths(&USER_COLUMN_WIDTHS)
    };

    vec![
        sheet("Todos", None),
        sheet("Administradores", Some(Rol::Administrador)),
        sheet("Entrenadores", Some(Rol::Entrenador)),
        sheet("Clientes", Some(Rol::Cliente)),
    ]
}

pub fn weight_csv_filename(user_id: i64) -> String {
    format!("weight_history_{}.csv", user_id)
}

/// `date,weight_kg` rows of the weight history
pub fn weight_csv(points: &[WeightPoint]) -> String {
    let mut csv = String::from("date,weight_kg\n");
    let body: Vec<String> = points
        .iter()
        .map(|p| {
            let weight = p.weight.map(|w| w.to_string()).unwrap_or_default();
            format!("{},{}", p.date, weight)
        })
        .collect();
    csv.push_str(&body.join("\n"));
    csv
}
