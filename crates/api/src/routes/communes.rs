//! Commune route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use ferremas_core::CommuneId;

use super::parse_id;
use crate::db::CommuneRepository;
use crate::error::{AppError, Result};
use crate::models::commune::Commune;
use crate::state::AppState;

/// `GET /comunas`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Commune>>> {
    let communes = CommuneRepository::new(state.pool()).list().await?;
    Ok(Json(communes))
}

/// `GET /comunas/{id}`
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Commune>> {
    let id: CommuneId = parse_id(&id)?;
    let commune = CommuneRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comuna no encontrada".to_owned()))?;
    Ok(Json(commune))
}
