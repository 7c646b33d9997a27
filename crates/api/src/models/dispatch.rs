//! Dispatch domain types.

use serde::Serialize;

use ferremas_core::{Destination, DispatchId, DispatchKind, Rut};

/// A dispatch record.
///
/// `direccion` and `sucursal` are mutually exclusive; the table's check
/// constraint guarantees rows read back satisfy [`Destination`]'s rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Dispatch {
    pub id: DispatchId,
    pub rut_usuario: Rut,
    pub tipo: DispatchKind,
    pub direccion: Option<String>,
    pub sucursal: Option<String>,
}

/// A dispatch record as listed for a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserDispatch {
    pub id: DispatchId,
    pub tipo: DispatchKind,
    pub direccion: Option<String>,
    pub sucursal: Option<String>,
}

/// A validated dispatch ready to insert.
#[derive(Debug, Clone)]
pub struct NewDispatch {
    pub rut_usuario: Rut,
    pub destino: Destination,
}
