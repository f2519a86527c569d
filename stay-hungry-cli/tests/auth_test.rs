use anyhow::Result;
use mockito::{Matcher, Server};
use stay_hungry_cli::api::{ApiClient, ApiError, LoginRequest};
use stay_hungry_cli::commands::{register, Submitted};
use stay_hungry_cli::config::Config;
use stay_hungry_cli::models::{Rol, UserProfile};
use stay_hungry_cli::router::{Navigator, Route};
use stay_hungry_cli::session::SessionContext;
use stay_hungry_cli::storage::{Storage, TOKEN_KEY, USER_KEY};
use stay_hungry_cli::validation::RegisterForm;
use tempfile::TempDir;

const USER_JSON: &str = r#"{
    "id": 7,
    "nombre": "Carla Núñez",
    "email": "carla@gym.com",
    "rol": "Cliente",
    "edad": 29,
    "peso": "64.50",
    "estatura": 1.68,
    "fecha_registro": "2024-11-02T09:30:00.000Z",
    "activo": 1
}"#;

fn auth_body(token: &str) -> String {
    format!(
        r#"{{"success": true, "data": {{"user": {}, "token": "{}"}}}}"#,
        USER_JSON, token
    )
}

fn client(server: &Server, dir: &TempDir) -> Result<(ApiClient, SessionContext)> {
    let mut config = Config::default();
    config.api.base_url = server.url();
    config.tracker.enabled = false;

    let session = SessionContext::restore(Storage::open(dir.path())?)?;
    let api = ApiClient::new(&config, session.clone())?;
    Ok((api, session))
}

fn stored_user() -> UserProfile {
    serde_json::from_str(USER_JSON).unwrap()
}

#[tokio::test]
async fn test_login_persists_session() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::PartialJsonString(
            r#"{"email": "carla@gym.com"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_body("tok-123"))
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;

    let auth = api
        .login(&LoginRequest {
            email: "carla@gym.com".to_string(),
            password: "secreto".to_string(),
        })
        .await?;

    mock.assert_async().await;
    assert_eq!(auth.user.rol, Rol::Cliente);
    assert_eq!(auth.user.peso, Some(64.5));
    assert_eq!(session.token().as_deref(), Some("tok-123"));
    assert_eq!(
        session.storage().get_item(TOKEN_KEY)?.as_deref(),
        Some("tok-123")
    );
    assert!(session.storage().get_item(USER_KEY)?.is_some());

    // A fresh context over the same storage restores the session
    let restored = SessionContext::restore(session.storage().clone())?;
    assert_eq!(restored.user().map(|u| u.id), Some(7));
    Ok(())
}

#[tokio::test]
async fn test_login_rejected_by_envelope() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "message": "Credenciales inválidas"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;

    let err = api
        .login(&LoginRequest {
            email: "carla@gym.com".to_string(),
            password: "mala".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::AuthenticationFailed(_))
    ));
    assert!(err.to_string().contains("Credenciales inválidas"));
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_expires_session_once() -> Result<()> {
    let mut server = Server::new_async().await;
    let profile = server
        .mock("GET", "/api/auth/profile")
        .with_status(401)
        .with_body(r#"{"message": "Token inválido"}"#)
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;
    session.login(stored_user(), "stale".to_string())?;

    let mut navigator = Navigator::new(session.clone());
    navigator.navigate("/progress");
    assert_eq!(navigator.current(), Route::Progress);

    let (a, b) = tokio::join!(api.profile(), api.profile());
    profile.assert_async().await;

    for result in [a, b] {
        let err = result.unwrap_err();
        assert!(err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized));
    }

    assert!(!session.is_authenticated());
    assert_eq!(session.storage().get_item(TOKEN_KEY)?, None);
    assert_eq!(session.storage().get_item(USER_KEY)?, None);

    assert!(navigator.take_expired());
    assert_eq!(navigator.current(), Route::Login);
    assert!(!navigator.take_expired());

    // Already logged out: nothing left to expire
    assert!(!session.expire());
    Ok(())
}

#[tokio::test]
async fn test_register_with_invalid_age_sends_nothing() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/register")
        .with_status(201)
        .with_body(auth_body("tok"))
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;

    let form = RegisterForm {
        nombre: "Carla Núñez".to_string(),
        email: "carla@gym.com".to_string(),
        password: "secreto".to_string(),
        confirm_password: "secreto".to_string(),
        edad: "15".to_string(),
        peso: "64.5".to_string(),
        estatura: "1.68".to_string(),
    };

    match register::submit(&api, &form).await? {
        Submitted::Invalid(errors) => {
            assert!(errors.contains("edad"));
            assert_eq!(errors.len(), 1);
        }
        Submitted::Accepted(_) => panic!("registration should not be sent"),
    }

    mock.assert_async().await;
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_register_sends_validated_payload() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/register")
        .match_body(Matcher::PartialJsonString(
            r#"{"nombre": "Carla Núñez", "edad": 29, "estatura": 1.68}"#.to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(auth_body("tok-new"))
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;

    let form = RegisterForm {
        nombre: "Carla Núñez".to_string(),
        email: "carla@gym.com".to_string(),
        password: "secreto".to_string(),
        confirm_password: "secreto".to_string(),
        edad: "29".to_string(),
        peso: "64.5".to_string(),
        estatura: "1.68".to_string(),
    };

    assert!(matches!(
        register::submit(&api, &form).await?,
        Submitted::Accepted(_)
    ));
    mock.assert_async().await;
    assert_eq!(session.token().as_deref(), Some("tok-new"));
    Ok(())
}

#[tokio::test]
async fn test_profile_update_refreshes_stored_user() -> Result<()> {
    let mut server = Server::new_async().await;
    let updated = USER_JSON.replace(r#""peso": "64.50""#, r#""peso": 62"#);
    server
        .mock("PUT", "/api/auth/profile")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"success": true, "data": {{"user": {}}}}}"#,
            updated
        ))
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let (api, session) = client(&server, &dir)?;
    session.login(stored_user(), "tok-1".to_string())?;

    let update = stay_hungry_cli::validation::ProfileForm {
        nombre: "Carla Núñez".to_string(),
        edad: "29".to_string(),
        peso: "62".to_string(),
        estatura: "1.68".to_string(),
    }
    .validate()
    .unwrap();

    let user = api.update_profile(&update).await?;
    assert_eq!(user.peso, Some(62.0));
    assert_eq!(session.user().and_then(|u| u.peso), Some(62.0));

    let restored = SessionContext::restore(session.storage().clone())?;
    assert_eq!(restored.user().and_then(|u| u.peso), Some(62.0));
    assert_eq!(restored.token().as_deref(), Some("tok-1"));
    Ok(())
}

#[test]
fn test_api_error_from_status() {
    use reqwest::StatusCode;

    let error = ApiError::from_status(StatusCode::UNAUTHORIZED, "Unauthorized".to_string());
    assert!(matches!(error, ApiError::Unauthorized(_)));

    let error = ApiError::from_status(StatusCode::NOT_FOUND, "Not Found".to_string());
    assert!(matches!(error, ApiError::NotFound(_)));

    let error = ApiError::from_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server Error".to_string(),
    );
    assert!(matches!(error, ApiError::ServerError(_)));
}
