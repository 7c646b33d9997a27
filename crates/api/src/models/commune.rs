//! Commune reference data.

use serde::Serialize;

use ferremas_core::CommuneId;

/// A commune (static reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Commune {
    pub id_comuna: CommuneId,
    pub nombre: String,
}
