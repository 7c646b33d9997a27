//! User route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use ferremas_core::{CommuneId, Email, Phone, Role, Rut};

use super::{
    ApiJson, double_option, mensaje, non_blank, parse_field, parse_optional, parse_patch,
    required_text,
};
use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::user::{User, UserSummary};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::users::{UserChanges, UserPatch, UserService};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "Usuario no encontrado";

/// Login query parameters.
///
/// Both are optional so a missing parameter fails like a wrong password.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub email: Option<String>,
    pub clave: Option<String>,
}

/// Registration body for clients and staff.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub rut: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: Option<String>,
    pub clave: String,
    pub id_comuna: Option<i32>,
    /// Staff role; ignored for client self-registration.
    pub rol: Option<String>,
}

/// Full update body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: Option<String>,
    pub id_comuna: Option<i32>,
}

/// Partial update body. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub nombre: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub apellido: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub telefono: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rol: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub id_comuna: Option<Option<i32>>,
}

/// Password change body.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub clave_nueva: String,
    /// Present when users change their own password.
    pub clave_actual: Option<String>,
}

fn parse_rut(raw: &str) -> Result<Rut> {
    parse_field(Rut::parse(raw))
}

impl RegistrationRequest {
    fn into_registration(self) -> Result<Registration> {
        Ok(Registration {
            rut: parse_rut(&self.rut)?,
            nombre: required_text("nombre", &self.nombre)?,
            apellido: required_text("apellido", &self.apellido)?,
            email: parse_field(Email::parse(&self.email))?,
            telefono: parse_optional(self.telefono.as_deref(), Phone::parse)?,
            clave: self.clave,
            id_comuna: self.id_comuna.map(CommuneId::new),
        })
    }
}

impl UpdateRequest {
    fn into_changes(self) -> Result<UserChanges> {
        Ok(UserChanges {
            nombre: required_text("nombre", &self.nombre)?,
            apellido: required_text("apellido", &self.apellido)?,
            email: parse_field(Email::parse(&self.email))?,
            telefono: parse_optional(self.telefono.as_deref(), Phone::parse)?,
            id_comuna: self.id_comuna.map(CommuneId::new),
        })
    }
}

impl PatchRequest {
    fn into_patch(self) -> Result<UserPatch> {
        Ok(UserPatch {
            nombre: parse_patch(self.nombre, |v| non_blank("nombre", v))?,
            apellido: parse_patch(self.apellido, |v| non_blank("apellido", v))?,
            email: parse_patch(self.email, Email::parse)?,
            telefono: parse_patch(self.telefono, Phone::parse)?,
            rol: parse_patch(self.rol, str::parse::<Role>)?,
            id_comuna: self.id_comuna.map(|id| id.map(CommuneId::new)),
        })
    }
}

/// Map a password-change failure, naming the user on `NotFound`.
fn password_change_error(err: AuthError) -> AppError {
    match err {
        AuthError::Repository(RepositoryError::NotFound) => {
            AppError::NotFound(USER_NOT_FOUND.to_owned())
        }
        other => other.into(),
    }
}

/// `GET /usuarios`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// `GET /usuarios/{rut}`
pub async fn show(State(state): State<AppState>, Path(rut): Path<String>) -> Result<Json<User>> {
    let rut = parse_rut(&rut)?;
    let user = UserRepository::new(state.pool())
        .get_by_rut(&rut)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_owned()))?;
    Ok(Json(user))
}

/// `GET /usuarios/email/{email}`
pub async fn show_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>> {
    let email = parse_field(Email::parse(&email))?;
    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_owned()))?;
    Ok(Json(user))
}

/// `GET /usuarios/login?email=...&clave=...`
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<UserSummary>> {
    let (Some(email), Some(clave)) = (query.email, query.clave) else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let summary = AuthService::new(state.pool(), state.hasher())
        .login(&email, &clave)
        .await?;
    Ok(Json(summary))
}

/// `POST /usuarios/registro-cliente`
pub async fn register_client(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegistrationRequest>,
) -> Result<Json<Value>> {
    let registration = body.into_registration()?;
    let user = AuthService::new(state.pool(), state.hasher())
        .register_client(registration)
        .await?;
    Ok(Json(
        json!({ "mensaje": "Cliente registrado con éxito", "rut": user.rut }),
    ))
}

/// `POST /usuarios/registro-trabajador`
pub async fn register_worker(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegistrationRequest>,
) -> Result<Json<Value>> {
    let role = match body.rol.as_deref() {
        Some(rol) => parse_field(rol.parse::<Role>())?,
        None => return Err(AppError::BadRequest("Debe indicar un rol".to_owned())),
    };
    let registration = body.into_registration()?;

    let user = AuthService::new(state.pool(), state.hasher())
        .register_worker(registration, role)
        .await?;
    Ok(Json(
        json!({ "mensaje": "Trabajador registrado con éxito", "rut": user.rut, "rol": user.rol }),
    ))
}

/// `PUT /usuarios/{rut}`
pub async fn update(
    State(state): State<AppState>,
    Path(rut): Path<String>,
    ApiJson(body): ApiJson<UpdateRequest>,
) -> Result<Json<Value>> {
    let rut = parse_rut(&rut)?;
    let changes = body.into_changes()?;

    UserService::new(state.pool())
        .update(&rut, changes)
        .await
        .map_err(AppError::not_found_as(USER_NOT_FOUND))?;
    Ok(mensaje("Usuario actualizado con éxito"))
}

/// `PATCH /usuarios/modificar/{rut}`
pub async fn patch(
    State(state): State<AppState>,
    Path(rut): Path<String>,
    ApiJson(body): ApiJson<PatchRequest>,
) -> Result<Json<Value>> {
    let rut = parse_rut(&rut)?;
    let patch = body.into_patch()?;

    UserService::new(state.pool())
        .patch(&rut, patch)
        .await
        .map_err(AppError::not_found_as(USER_NOT_FOUND))?;
    Ok(mensaje("Usuario actualizado con éxito"))
}

/// `PATCH /usuarios/modificar-clave/{rut}`
pub async fn change_password(
    State(state): State<AppState>,
    Path(rut): Path<String>,
    ApiJson(body): ApiJson<PasswordChangeRequest>,
) -> Result<Json<Value>> {
    let rut = parse_rut(&rut)?;

    AuthService::new(state.pool(), state.hasher())
        .change_password(&rut, body.clave_actual.as_deref(), &body.clave_nueva)
        .await
        .map_err(password_change_error)?;
    Ok(mensaje("Clave actualizada con éxito"))
}

/// `DELETE /usuarios/eliminar/{rut}`
pub async fn destroy(State(state): State<AppState>, Path(rut): Path<String>) -> Result<Json<Value>> {
    let rut = parse_rut(&rut)?;

    UserService::new(state.pool())
        .delete(&rut)
        .await
        .map_err(AppError::not_found_as(USER_NOT_FOUND))?;
    Ok(mensaje("Usuario eliminado con éxito"))
}
