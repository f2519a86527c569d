use anyhow::Result;
use chrono::NaiveDate;
use mockito::{Matcher, Mock, Server};
use stay_hungry_cli::api::{ApiClient, DateRange};
use stay_hungry_cli::config::Config;
use stay_hungry_cli::export::{self, reports};
use stay_hungry_cli::models::{AnalyticsKpis, ProgressKpis};
use stay_hungry_cli::session::SessionContext;
use stay_hungry_cli::storage::Storage;
use tempfile::TempDir;

fn client(server: &Server, dir: &TempDir) -> Result<ApiClient> {
    let mut config = Config::default();
    config.api.base_url = server.url();
    config.tracker.enabled = false;

    let session = SessionContext::restore(Storage::open(dir.path())?)?;
    ApiClient::new(&config, session)
}

async fn json(server: &mut Server, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn range() -> DateRange {
    DateRange {
        from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        to: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    }
}

#[tokio::test]
async fn test_failed_report_shows_empty_dataset() -> Result<()> {
    let mut server = Server::new_async().await;

    let churn = server
        .mock("GET", "/api/reports/users/churn")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from".into(), "2025-01-01".into()),
            Matcher::UrlEncoded("to".into(), "2025-03-31".into()),
        ]))
        .with_status(500)
        .with_body(r#"{"error": "db down"}"#)
        .create_async()
        .await;
    json(
        &mut server,
        "/api/reports/adherence",
        r#"{"overall": {"clientes_con_sets": 6, "total_clientes": 8, "adherencia_pct": "75.00"}, "by_trainer": []}"#,
    )
    .await;
    let volume = server
        .mock("GET", "/api/reports/volume")
        .match_query(Matcher::UrlEncoded("groupBy".into(), "week".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"iso_week": "2025-W02", "carga_total": "1200.5"}, {"iso_week": "2025-W03", "carga_total": 800}]"#)
        .create_async()
        .await;
    json(
        &mut server,
        "/api/reports/prs",
        r#"[{"fecha": "2025-02-10", "usuario": "Carla", "ejercicio": "Sentadilla", "est_1rm": 95.3}]"#,
    )
    .await;
    json(
        &mut server,
        "/api/reports/trainers/clients",
        r#"{"rows": [{"entrenador": "Eva", "clientes": 5}], "sin_asignar": 2}"#,
    )
    .await;
    json(
        &mut server,
        "/api/analytics/usage-summary",
        r#"{"sessions": 4, "minutes_active": "37.5", "pages": [{"path": "/dashboard", "hits": 10, "users": 3}, {"path": "/progress", "hits": "5", "users": 2}]}"#,
    )
    .await;

    let dir = tempfile::tempdir()?;
    let api = client(&server, &dir)?;

    let data = api.analytics(&range()).await;
    churn.assert_async().await;
    volume.assert_async().await;

    assert!(data.churn.is_empty());
    assert_eq!(data.volume.len(), 2);
    assert_eq!(data.prs.len(), 1);
    assert_eq!(data.trainer_clients.sin_asignar, 2.0);

    let kpis = AnalyticsKpis::compute(&data);
    assert_eq!(kpis.altas, 0.0);
    assert_eq!(kpis.carga_total, 2000.5);
    assert_eq!(kpis.adherencia_pct, Some(75.0));
    assert_eq!(kpis.prs, 1);
    assert_eq!(kpis.page_views, 15.0);
    assert_eq!(kpis.minutes_active, 37.5);

    // The failed dataset still gets its sheet
    let sheets = reports::admin_sheets(&data);
    assert_eq!(sheets.len(), 6);
    let bytes = export::workbook_bytes(&sheets)?;
    assert!(bytes.starts_with(b"PK"));
    Ok(())
}

#[tokio::test]
async fn test_progress_with_every_request_failing() -> Result<()> {
    let mut server = Server::new_async().await;
    for path in [
        "/api/progress/weight-history",
        "/api/progress/bmi-history",
        "/api/progress/strength-prs",
        "/api/calories/by-session",
    ] {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
    }

    let dir = tempfile::tempdir()?;
    let api = client(&server, &dir)?;

    let data = api.progress(7, 90).await;
    assert_eq!(data.days, 90);
    assert!(data.weight.is_empty());
    assert!(data.calories.is_empty());

    let kpis = ProgressKpis::compute(&data);
    assert_eq!(kpis, ProgressKpis::default());

    let bytes = export::workbook_bytes(&reports::progress_sheets(&data, &kpis))?;
    let path = export::write_file(dir.path(), &reports::progress_filename(7, range().to), &bytes)?;
    assert!(path.ends_with("progreso_7_2025-03-31.xlsx"));
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn test_progress_queries_user_and_days() -> Result<()> {
    let mut server = Server::new_async().await;
    let weight = server
        .mock("GET", "/api/progress/weight-history")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("usuarioId".into(), "7".into()),
            Matcher::UrlEncoded("days".into(), "30".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"date": "2025-03-01", "weight": "70.0"}, {"date": "2025-03-15", "weight": 68.6}]"#)
        .create_async()
        .await;
    for path in [
        "/api/progress/bmi-history",
        "/api/progress/strength-prs",
        "/api/calories/by-session",
    ] {
        json(&mut server, path, "[]").await;
    }

    let dir = tempfile::tempdir()?;
    let api = client(&server, &dir)?;

    let data = api.progress(7, 30).await;
    weight.assert_async().await;

    let kpis = ProgressKpis::compute(&data);
    assert_eq!(kpis.last_weight, Some(68.6));
    assert_eq!(kpis.delta_kg, Some(-1.4));
    assert_eq!(kpis.delta_pct, Some(-2.0));

    let csv = reports::weight_csv(&data.weight);
    assert_eq!(csv, "date,weight_kg\n2025-03-01,70\n2025-03-15,68.6");
    Ok(())
}
