//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Users
//! GET    /usuarios                       - List users
//! GET    /usuarios/{rut}                 - Get user
//! PUT    /usuarios/{rut}                 - Full update
//! GET    /usuarios/email/{email}         - Get user by email
//! GET    /usuarios/login?email&clave     - Authenticate
//! POST   /usuarios/registro-cliente      - Client self-registration
//! POST   /usuarios/registro-trabajador   - Staff account creation
//! PATCH  /usuarios/modificar/{rut}       - Partial update
//! PATCH  /usuarios/modificar-clave/{rut} - Change password
//! DELETE /usuarios/eliminar/{rut}        - Delete user
//!
//! # Payments
//! GET    /pagos                          - List payments
//! POST   /pagos                          - Register payment
//! GET    /pagos/tipos                    - Payment types
//! GET    /pagos/usuario/{rut}            - Payments of a user
//! DELETE /pagos/{id}                     - Delete payment
//!
//! # Dispatch
//! GET    /despacho                       - List dispatch records
//! POST   /despacho                       - Register dispatch
//! GET    /despacho/usuario/{rut}         - Dispatch records of a user
//! PATCH  /despacho/{id}                  - Partial update
//! DELETE /despacho/{id}                  - Delete dispatch record
//!
//! # Communes
//! GET    /comunas                        - List communes
//! GET    /comunas/{id}                   - Get commune
//! ```
//!
//! Mutations answer `{"mensaje": "..."}`; errors answer `{"detail": "..."}`.

pub mod communes;
pub mod dispatch;
pub mod payments;
pub mod users;

use std::fmt::Display;

use axum::{
    Json, Router,
    extract::{FromRequest, Request},
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections render as `{"detail": ...}` with 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// `{"mensaje": text}`.
pub fn mensaje(text: &str) -> Json<Value> {
    Json(json!({ "mensaje": text }))
}

/// Parse a domain value, turning the parse error into a 400.
///
/// # Errors
///
/// Returns `AppError::BadRequest` with the parse error's message.
pub fn parse_field<T, E: Display>(result: Result<T, E>) -> Result<T, AppError> {
    result.map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse an optional domain value; `None` stays `None`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if a present value fails to parse.
pub fn parse_optional<T, E: Display>(
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<Option<T>, AppError> {
    value.map(parse).transpose().map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse the value of a partial-update field, keeping absent and `null`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if a present value fails to parse.
pub fn parse_patch<T, E: Display>(
    value: Option<Option<String>>,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<Option<Option<T>>, AppError> {
    value
        .map(|inner| parse_optional(inner.as_deref(), parse))
        .transpose()
}

/// A required text field was blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("El campo {0} no puede estar vacío")]
pub struct BlankFieldError(pub &'static str);

/// Trimmed, non-empty text.
///
/// # Errors
///
/// Returns [`BlankFieldError`] naming `field` when the text is blank.
pub fn non_blank(field: &'static str, value: &str) -> Result<String, BlankFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlankFieldError(field));
    }
    Ok(trimmed.to_owned())
}

/// Trimmed, non-empty text, as a 400 on failure.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming `field` when the text is blank.
pub fn required_text(field: &'static str, value: &str) -> Result<String, AppError> {
    parse_field(non_blank(field, value))
}

/// Numeric path identifier.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when `raw` is not an integer.
pub fn parse_id<T: From<i32>>(raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<i32>()
        .map(T::from)
        .map_err(|_| AppError::BadRequest("Identificador inválido".to_owned()))
}

/// Deserialize a field that may be absent, `null`, or a value.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: an
/// absent field stays `None` (via `default`), `null` becomes `Some(None)`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/login", get(users::login))
        .route("/registro-cliente", post(users::register_client))
        .route("/registro-trabajador", post(users::register_worker))
        .route("/email/{email}", get(users::show_by_email))
        .route("/modificar/{rut}", patch(users::patch))
        .route("/modificar-clave/{rut}", patch(users::change_password))
        .route("/eliminar/{rut}", delete(users::destroy))
        .route("/{rut}", get(users::show).put(users::update))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::index).post(payments::create))
        .route("/tipos", get(payments::types))
        .route("/usuario/{rut}", get(payments::by_user))
        .route("/{id}", delete(payments::destroy))
}

/// Create the dispatch routes router.
pub fn dispatch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dispatch::index).post(dispatch::create))
        .route("/usuario/{rut}", get(dispatch::by_user))
        .route("/{id}", patch(dispatch::patch).delete(dispatch::destroy))
}

/// Create the commune routes router.
pub fn commune_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(communes::index))
        .route("/{id}", get(communes::show))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/usuarios", user_routes())
        .nest("/pagos", payment_routes())
        .nest("/despacho", dispatch_routes())
        .nest("/comunas", commune_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "double_option")]
        telefono: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_absent_and_null() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.telefono, None);

        let null: Body = serde_json::from_str(r#"{"telefono": null}"#).unwrap();
        assert_eq!(null.telefono, Some(None));

        let value: Body = serde_json::from_str(r#"{"telefono": "912345678"}"#).unwrap();
        assert_eq!(value.telefono, Some(Some("912345678".to_owned())));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("nombre", "  Ana ").unwrap(), "Ana");
        assert!(matches!(
            required_text("nombre", "   "),
            Err(AppError::BadRequest(ref msg)) if msg == "El campo nombre no puede estar vacío"
        ));
    }

    #[test]
    fn test_parse_id() {
        let id: ferremas_core::PaymentId = parse_id("42").unwrap();
        assert_eq!(id.as_i32(), 42);
        assert!(parse_id::<ferremas_core::PaymentId>("abc").is_err());
    }
}
