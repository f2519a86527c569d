use serde::{Deserialize, Serialize};

use super::lenient;

/// User role, controls which screens are reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rol {
    Administrador,
    Entrenador,
    Cliente,
}

impl Rol {
    pub const ALL: [Rol; 3] = [Rol::Administrador, Rol::Entrenador, Rol::Cliente];

    pub fn welcome_message(&self) -> &'static str {
        match self {
            Rol::Administrador => "Gestiona tu gimnasio desde aquí",
            Rol::Entrenador => "Ayuda a tus clientes a alcanzar sus objetivos",
            Rol::Cliente => "¡Es hora de entrenar y mantenerse fuerte!",
        }
    }
}

impl std::fmt::Display for Rol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rol::Administrador => write!(f, "Administrador"),
            Rol::Entrenador => write!(f, "Entrenador"),
            Rol::Cliente => write!(f, "Cliente"),
        }
    }
}

impl std::str::FromStr for Rol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrador" | "admin" => Ok(Rol::Administrador),
            "entrenador" | "trainer" => Ok(Rol::Entrenador),
            "cliente" | "client" => Ok(Rol::Cliente),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

fn default_active() -> bool {
    true
}

/// User record as returned by the API.
///
/// Cached locally for display only; the server owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    #[serde(default, deserialize_with = "lenient::u32_opt")]
    pub edad: Option<u32>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub peso: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub estatura: Option<f64>,
    #[serde(default)]
    pub fecha_registro: Option<String>,
    #[serde(default = "default_active", deserialize_with = "lenient::flag")]
    pub activo: bool,
}

impl UserProfile {
    pub fn bmi(&self) -> Option<f64> {
        bmi(self.peso?, self.estatura?)
    }

    /// Initials for the header avatar ("U" when the name is empty)
    pub fn initials(&self) -> String {
        let initials: String = self
            .nombre
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    /// Registration date as `YYYY-MM-DD`, or a placeholder
    pub fn member_since(&self) -> String {
        match self.fecha_registro.as_deref() {
            Some(raw) if !raw.is_empty() => raw.get(..10).unwrap_or(raw).to_string(),
            _ => "No disponible".to_string(),
        }
    }
}

/// Body-mass index (IMC) from weight in kg and height in metres
pub fn bmi(peso: f64, estatura: f64) -> Option<f64> {
    if peso <= 0.0 || estatura <= 0.0 {
        return None;
    }
    Some(peso / (estatura * estatura))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    BajoPeso,
    Normal,
    Sobrepeso,
    Obesidad,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::BajoPeso
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Sobrepeso
        } else {
            BmiCategory::Obesidad
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BmiCategory::BajoPeso => write!(f, "Bajo peso"),
            BmiCategory::Normal => write!(f, "Peso normal"),
            BmiCategory::Sobrepeso => write!(f, "Sobrepeso"),
            BmiCategory::Obesidad => write!(f, "Obesidad"),
        }
    }
}

/// Active/inactive filter on the admin user list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Todos,
    Activos,
    Inactivos,
}

impl std::str::FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todos" | "all" => Ok(StatusFilter::Todos),
            "activos" | "active" => Ok(StatusFilter::Activos),
            "inactivos" | "inactive" => Ok(StatusFilter::Inactivos),
            _ => Err(anyhow::anyhow!("Invalid status filter: {}", s)),
        }
    }
}

/// Filter criteria for the admin user list
#[derive(Debug, Default)]
pub struct UserFilter {
    pub rol: Option<Rol>,
    pub status: StatusFilter,
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &UserProfile) -> bool {
        if let Some(rol) = self.rol {
            if user.rol != rol {
                return false;
            }
        }

        match self.status {
            StatusFilter::Todos => {}
            StatusFilter::Activos if !user.activo => return false,
            StatusFilter::Inactivos if user.activo => return false,
            _ => {}
        }

        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            if !user.nombre.to_lowercase().contains(&term)
                && !user.email.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        true
    }
}

/// Active users per role, as shown on the admin screens
pub fn active_count(users: &[UserProfile], rol: Rol) -> usize {
    users.iter().filter(|u| u.rol == rol && u.activo).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(nombre: &str, rol: Rol, activo: bool) -> UserProfile {
        UserProfile {
            id: 1,
            nombre: nombre.to_string(),
            email: format!("{}@gym.com", nombre.to_lowercase().replace(' ', ".")),
            rol,
            edad: Some(30),
            peso: Some(80.0),
            estatura: Some(1.80),
            fecha_registro: Some("2024-03-01T10:00:00.000Z".to_string()),
            activo,
        }
    }

    #[test]
    fn test_user_parses_loose_api_shapes() {
        let json = r#"{
            "id": 7, "nombre": "Ana Ruiz", "email": "ana@gym.com", "rol": "Cliente",
            "edad": "28", "peso": "61.50", "estatura": 1.65, "activo": 0
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.edad, Some(28));
        assert_eq!(user.peso, Some(61.5));
        assert!(!user.activo);
        assert_eq!(user.fecha_registro, None);
    }

    #[test]
    fn test_bmi_and_category() {
        let u = user("Juan Perez", Rol::Cliente, true);
        let value = u.bmi().unwrap();
        assert!((value - 24.69).abs() < 0.01);
        assert_eq!(BmiCategory::from_bmi(value), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::BajoPeso);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Sobrepeso);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obesidad);
        assert_eq!(bmi(70.0, 0.0), None);
    }

    #[test]
    fn test_initials_and_member_since() {
        let u = user("juan carlos perez", Rol::Cliente, true);
        assert_eq!(u.initials(), "JCP");
        assert_eq!(u.member_since(), "2024-03-01");

        let mut anon = user("", Rol::Cliente, true);
        anon.fecha_registro = None;
        assert_eq!(anon.initials(), "U");
        assert_eq!(anon.member_since(), "No disponible");
    }

    #[test]
    fn test_user_filter() {
        let users = vec![
            user("Ana Admin", Rol::Administrador, true),
            user("Roberto Trainer", Rol::Entrenador, true),
            user("Juan Cliente", Rol::Cliente, false),
            user("Maria Cliente", Rol::Cliente, true),
        ];

        let filter = UserFilter {
            rol: Some(Rol::Cliente),
            status: StatusFilter::Activos,
            search: None,
        };
        let hits: Vec<_> = users.iter().filter(|u| filter.matches(u)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].nombre, "Maria Cliente");

        let filter = UserFilter {
            search: Some("TRAINER".to_string()),
            ..Default::default()
        };
        assert_eq!(users.iter().filter(|u| filter.matches(u)).count(), 1);

        assert_eq!(active_count(&users, Rol::Cliente), 1);
    }

    #[test]
    fn test_rol_from_str() {
        assert_eq!("entrenador".parse::<Rol>().unwrap(), Rol::Entrenador);
        assert_eq!("Admin".parse::<Rol>().unwrap(), Rol::Administrador);
        assert!("coach".parse::<Rol>().is_err());
    }
}
