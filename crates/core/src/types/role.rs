//! User roles.

use serde::{Deserialize, Serialize};

/// Error returned for a role name outside the fixed set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Rol inválido: {0}")]
pub struct RoleError(pub String);

/// Role of a user account.
///
/// Stored as lowercase text in `ferremas.usuario.rol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Self-registered customer. Only assignable through self-registration.
    Cliente,
    /// Sales staff.
    Vendedor,
    /// Accounting staff.
    Contador,
    /// Warehouse staff.
    Bodeguero,
    /// Full administrative access. May have no commune.
    Administrador,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Cliente,
        Self::Vendedor,
        Self::Contador,
        Self::Bodeguero,
        Self::Administrador,
    ];

    /// The database/wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Vendedor => "vendedor",
            Self::Contador => "contador",
            Self::Bodeguero => "bodeguero",
            Self::Administrador => "administrador",
        }
    }

    /// Whether an administrator may assign this role when creating staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        !matches!(self, Self::Cliente)
    }

    /// Whether accounts with this role must reference a commune.
    #[must_use]
    pub const fn requires_commune(&self) -> bool {
        !matches!(self, Self::Administrador)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| RoleError(s.to_owned()))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrips_every_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(" Bodeguero ".parse::<Role>().unwrap(), Role::Bodeguero);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!(
            "gerente".parse::<Role>(),
            Err(RoleError("gerente".to_owned()))
        );
    }

    #[test]
    fn test_staff_and_commune_rules() {
        assert!(!Role::Cliente.is_staff());
        assert!(Role::Vendedor.is_staff());
        assert!(Role::Administrador.is_staff());
        assert!(Role::Cliente.requires_commune());
        assert!(!Role::Administrador.requires_commune());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::Contador).unwrap();
        assert_eq!(json, "\"contador\"");
    }
}
