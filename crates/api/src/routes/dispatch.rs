//! Dispatch route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use ferremas_core::{DispatchId, DispatchKind, Rut};

use super::{ApiJson, double_option, mensaje, parse_field, parse_id, parse_patch};
use crate::db::DispatchRepository;
use crate::error::{AppError, Result};
use crate::models::dispatch::{Dispatch, UserDispatch};
use crate::services::dispatch::{DispatchPatch, DispatchService};
use crate::state::AppState;

const DISPATCH_NOT_FOUND: &str = "Despacho no encontrado";

/// Dispatch registration body.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub rut_usuario: String,
    pub tipo: String,
    pub direccion: Option<String>,
    pub sucursal: Option<String>,
}

/// Partial update body. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchPatchRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub tipo: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub direccion: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sucursal: Option<Option<String>>,
}

impl DispatchPatchRequest {
    fn into_patch(self) -> Result<DispatchPatch> {
        Ok(DispatchPatch {
            tipo: parse_patch(self.tipo, str::parse::<DispatchKind>)?,
            direccion: self.direccion,
            sucursal: self.sucursal,
        })
    }
}

/// `GET /despacho`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Dispatch>>> {
    let records = DispatchRepository::new(state.pool()).list().await?;
    Ok(Json(records))
}

/// `GET /despacho/usuario/{rut}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(rut): Path<String>,
) -> Result<Json<Vec<UserDispatch>>> {
    let rut = parse_field(Rut::parse(&rut))?;
    let records = DispatchRepository::new(state.pool())
        .list_by_user(&rut)
        .await?;

    if records.is_empty() {
        return Err(AppError::NotFound(
            "No se encontraron despachos para este usuario".to_owned(),
        ));
    }
    Ok(Json(records))
}

/// `POST /despacho`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DispatchRequest>,
) -> Result<Json<Value>> {
    let tipo = parse_field(body.tipo.parse::<DispatchKind>())?;
    let rut = parse_field(Rut::parse(&body.rut_usuario))?;

    let id = DispatchService::new(state.pool())
        .register(rut, tipo, body.direccion.as_deref(), body.sucursal.as_deref())
        .await?;
    Ok(Json(
        json!({ "mensaje": "Despacho registrado correctamente", "id": id }),
    ))
}

/// `PATCH /despacho/{id}`
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<DispatchPatchRequest>,
) -> Result<Json<Value>> {
    let id: DispatchId = parse_id(&id)?;
    let patch = body.into_patch()?;

    DispatchService::new(state.pool())
        .patch(id, patch)
        .await
        .map_err(AppError::not_found_as(DISPATCH_NOT_FOUND))?;
    Ok(mensaje("Despacho actualizado con éxito"))
}

/// `DELETE /despacho/{id}`
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id: DispatchId = parse_id(&id)?;

    DispatchRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found_as(DISPATCH_NOT_FOUND))?;

    tracing::info!(dispatch_id = %id, "Dispatch deleted");
    Ok(mensaje("Despacho eliminado con éxito"))
}
