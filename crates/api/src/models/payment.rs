//! Payment domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ferremas_core::{Amount, PaymentId, PaymentTypeId, Rut};

/// A payment joined with the payer's name and the payment type description.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentListing {
    pub id_pago: PaymentId,
    pub rut_usuario: Rut,
    pub nombre: String,
    pub apellido: String,
    pub id_tipo_pago: PaymentTypeId,
    pub tipo_pago: String,
    pub monto: Decimal,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub fecha_pago: DateTime<Utc>,
}

/// A payment as listed for a single user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserPayment {
    pub id_pago: PaymentId,
    pub id_tipo_pago: PaymentTypeId,
    pub tipo_pago: String,
    pub monto: Decimal,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub fecha_pago: DateTime<Utc>,
}

/// A payment type (static reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PaymentType {
    pub id_tipo_pago: PaymentTypeId,
    pub descripcion: String,
}

/// A validated payment ready to insert.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub rut_usuario: Rut,
    pub id_tipo_pago: PaymentTypeId,
    pub monto: Amount,
}
