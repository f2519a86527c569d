//! Form validation.
//!
//! Forms hold raw text as typed by the user. `validate` either returns the
//! request payload ready to send, or every field error at once.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::api::{LoginRequest, ProfileUpdate, RegisterRequest};
use crate::models::{NewSet, TemplateItem};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const EDAD_RANGE: (u32, u32) = (16, 100);
pub const PESO_RANGE: (f64, f64) = (30.0, 300.0);
pub const ESTATURA_RANGE: (f64, f64) = (1.0, 2.5);
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NOMBRE_LEN: usize = 2;
pub const MIN_SEARCH_LEN: usize = 2;

/// Field-keyed validation errors; empty means the form may be submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

/// Trimmed search term, or `None` when too short to search
pub fn search_term(raw: &str) -> Option<&str> {
    let term = raw.trim();
    (term.chars().count() >= MIN_SEARCH_LEN).then_some(term)
}

fn check_nombre(errors: &mut FieldErrors, nombre: &str) {
    let nombre = nombre.trim();
    if nombre.is_empty() {
        errors.add("nombre", "El nombre es requerido");
    } else if nombre.chars().count() < MIN_NOMBRE_LEN {
        errors.add("nombre", "El nombre debe tener al menos 2 caracteres");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "El email es requerido");
    } else if !is_valid_email(email) {
        errors.add("email", "El email no es válido");
    }
}

fn check_edad(errors: &mut FieldErrors, raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("edad", "La edad es requerida");
        return None;
    }
    match raw.parse::<u32>() {
        Ok(edad) if (EDAD_RANGE.0..=EDAD_RANGE.1).contains(&edad) => Some(edad),
        _ => {
            errors.add("edad", "La edad debe estar entre 16 y 100 años");
            None
        }
    }
}

fn check_decimal(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    (min, max): (f64, f64),
    required: &str,
    out_of_range: &str,
) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, required);
        return None;
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() && value >= min && value <= max => Some(value),
        _ => {
            errors.add(field, out_of_range);
            None
        }
    }
}

fn check_peso(errors: &mut FieldErrors, raw: &str) -> Option<f64> {
    check_decimal(
        errors,
        "peso",
        raw,
        PESO_RANGE,
        "El peso es requerido",
        "El peso debe estar entre 30 y 300 kg",
    )
}

fn check_estatura(errors: &mut FieldErrors, raw: &str) -> Option<f64> {
    check_decimal(
        errors,
        "estatura",
        raw,
        ESTATURA_RANGE,
        "La estatura es requerida",
        "La estatura debe estar entre 1.0 y 2.5 metros",
    )
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub edad: String,
    pub peso: String,
    pub estatura: String,
}

impl RegisterForm {
    /// The confirmation is checked here and dropped from the payload
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        check_nombre(&mut errors, &self.nombre);
        check_email(&mut errors, &self.email);

        if self.password.is_empty() {
            errors.add("password", "La contraseña es requerida");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "La contraseña debe tener al menos 6 caracteres");
        }

        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Confirma tu contraseña");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Las contraseñas no coinciden");
        }

        let edad = check_edad(&mut errors, &self.edad);
        let peso = check_peso(&mut errors, &self.peso);
        let estatura = check_estatura(&mut errors, &self.estatura);

        match (edad, peso, estatura) {
            (Some(edad), Some(peso), Some(estatura)) => errors.into_result(|| RegisterRequest {
                nombre: self.nombre.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
                edad,
                peso,
                estatura,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "La contraseña es requerida");
        }

        errors.into_result(|| LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub nombre: String,
    pub edad: String,
    pub peso: String,
    pub estatura: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        check_nombre(&mut errors, &self.nombre);
        let edad = check_edad(&mut errors, &self.edad);
        let peso = check_peso(&mut errors, &self.peso);
        let estatura = check_estatura(&mut errors, &self.estatura);

        match (edad, peso, estatura) {
            (Some(edad), Some(peso), Some(estatura)) => errors.into_result(|| ProfileUpdate {
                nombre: self.nombre.trim().to_string(),
                edad,
                peso,
                estatura,
            }),
            _ => Err(errors),
        }
    }
}

/// One editable template row, as typed
#[derive(Debug, Clone, Default)]
pub struct TemplateItemRow {
    pub ejercicio_id: String,
    pub orden: String,
    pub series: String,
    pub repeticiones: String,
    pub peso_objetivo: String,
}

fn positive<T: std::str::FromStr + PartialOrd + Default>(raw: &str) -> Option<T> {
    raw.trim().parse::<T>().ok().filter(|v| *v > T::default())
}

/// Validate every row; errors are keyed `fila<N>` (1-based) plus `orden`
/// when two rows share an order
pub fn validate_template_items(rows: &[TemplateItemRow]) -> Result<Vec<TemplateItem>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut items = Vec::with_capacity(rows.len());

    if rows.is_empty() {
        errors.add("items", "Agrega al menos un ejercicio");
    }

    for (i, row) in rows.iter().enumerate() {
        let key = format!("fila{}", i + 1);
        let ejercicio_id = positive::<i64>(&row.ejercicio_id);
        let orden = positive::<u32>(&row.orden);
        let series = positive::<u32>(&row.series);
        let repeticiones = positive::<u32>(&row.repeticiones);

        let peso_objetivo = match row.peso_objetivo.trim() {
            "" => Ok(None),
            raw => raw.replace(',', ".").parse::<f64>().map(Some),
        };

        match (ejercicio_id, orden, series, repeticiones, peso_objetivo) {
            (Some(ejercicio_id), Some(orden), Some(series), Some(repeticiones), Ok(peso_objetivo)) => {
                items.push(TemplateItem {
                    ejercicio_id,
                    orden,
                    series,
                    repeticiones,
                    peso_objetivo,
                });
            }
            (_, _, _, _, Err(_)) => {
                errors.add(key, format!("Fila {}: peso objetivo no es un número", i + 1));
            }
            _ => {
                errors.add(
                    key,
                    format!(
                        "Fila {}: ejercicio, orden, series y repeticiones son requeridos y deben ser > 0",
                        i + 1
                    ),
                );
            }
        }
    }

    let mut seen = HashSet::new();
    if items.iter().any(|item| !seen.insert(item.orden)) {
        errors.add("orden", "Hay órdenes repetidas (usa 1,2,3…)");
    }

    errors.into_result(|| items)
}

/// Set entry for one routine item
#[derive(Debug, Clone, Default)]
pub struct SetForm {
    pub set_num: u32,
    pub reps: String,
    pub peso_kg: String,
    pub rpe: String,
    pub es_max: bool,
}

impl SetForm {
    pub fn validate(&self, plantilla_ejercicio_id: i64) -> Result<NewSet, FieldErrors> {
        let mut errors = FieldErrors::new();

        let reps = positive::<u32>(&self.reps);
        if reps.is_none() {
            errors.add("reps", "Completa las repeticiones");
        }

        let peso_kg = self
            .peso_kg
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0);
        if peso_kg.is_none() {
            errors.add("pesoKg", "Completa el peso");
        }

        let rpe = match self.rpe.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(rpe) => Some(rpe),
                Err(_) => {
                    errors.add("rpe", "RPE no es un número");
                    None
                }
            },
        };

        match (reps, peso_kg) {
            (Some(reps), Some(peso_kg)) => errors.into_result(|| NewSet {
                plantilla_ejercicio_id,
                set_num: self.set_num.max(1),
                reps,
                peso_kg,
                rpe,
                es_max: self.es_max,
            }),
            _ => Err(errors),
        }
    }
}
