//! Payment route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use ferremas_core::{PaymentId, PaymentTypeId, Rut};

use super::{ApiJson, mensaje, parse_field, parse_id};
use crate::db::PaymentRepository;
use crate::error::{AppError, Result};
use crate::models::payment::{PaymentListing, PaymentType, UserPayment};
use crate::services::payments::PaymentService;
use crate::state::AppState;

/// Payment registration body.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub rut_usuario: String,
    pub id_tipo_pago: i32,
    pub monto: Decimal,
}

/// `GET /pagos`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<PaymentListing>>> {
    let payments = PaymentRepository::new(state.pool()).list().await?;
    Ok(Json(payments))
}

/// `GET /pagos/usuario/{rut}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(rut): Path<String>,
) -> Result<Json<Vec<UserPayment>>> {
    let rut = parse_field(Rut::parse(&rut))?;
    let payments = PaymentRepository::new(state.pool())
        .list_by_user(&rut)
        .await?;

    if payments.is_empty() {
        return Err(AppError::NotFound(
            "No se encontraron pagos para este usuario".to_owned(),
        ));
    }
    Ok(Json(payments))
}

/// `POST /pagos`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PaymentRequest>,
) -> Result<Json<Value>> {
    let rut = parse_field(Rut::parse(&body.rut_usuario))?;

    let id = PaymentService::new(state.pool())
        .register(rut, PaymentTypeId::new(body.id_tipo_pago), body.monto)
        .await?;
    Ok(Json(
        json!({ "mensaje": "Pago registrado con éxito", "id_pago": id }),
    ))
}

/// `DELETE /pagos/{id}`
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id: PaymentId = parse_id(&id)?;

    PaymentRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found_as("Pago no encontrado"))?;

    tracing::info!(payment_id = %id, "Payment deleted");
    Ok(mensaje("Pago eliminado con éxito"))
}

/// `GET /pagos/tipos`
pub async fn types(State(state): State<AppState>) -> Result<Json<Vec<PaymentType>>> {
    let types = PaymentRepository::new(state.pool()).list_types().await?;
    Ok(Json(types))
}
