//! Dispatch (delivery method) kinds.

use serde::{Deserialize, Serialize};

/// Error returned for an unknown dispatch kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Tipo de despacho inválido")]
pub struct DispatchKindError;

/// Error returned when the location fields don't match the dispatch kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    /// Home delivery without an address, or with a branch.
    #[error("Debe proporcionar solo una dirección para entrega a domicilio")]
    AddressOnly,
    /// Store pickup without a branch, or with an address.
    #[error("Debe proporcionar solo una sucursal para retiro en tienda")]
    BranchOnly,
}

/// How an order reaches the customer.
///
/// Each kind fixes which location field a dispatch record carries: home
/// delivery needs an address, store pickup needs a branch, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchKind {
    /// Delivered to the customer's address.
    #[serde(rename = "entrega domicilio")]
    HomeDelivery,
    /// Picked up by the customer at a branch.
    #[serde(rename = "retiro en tienda")]
    StorePickup,
}

impl DispatchKind {
    /// The database/wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HomeDelivery => "entrega domicilio",
            Self::StorePickup => "retiro en tienda",
        }
    }
}

impl std::fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DispatchKind {
    type Err = DispatchKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "entrega domicilio" => Ok(Self::HomeDelivery),
            "retiro en tienda" => Ok(Self::StorePickup),
            _ => Err(DispatchKindError),
        }
    }
}

/// Where a dispatch goes: exactly one of address or branch, fixed by the kind.
///
/// Blank strings count as absent, so `Some("  ")` is treated like `None`.
///
/// ```
/// use ferremas_core::{Destination, DispatchKind};
///
/// let home = Destination::new(DispatchKind::HomeDelivery, Some("Av. Matta 123"), None).unwrap();
/// assert_eq!(home.address(), Some("Av. Matta 123"));
///
/// assert!(Destination::new(DispatchKind::StorePickup, Some("Av. Matta 123"), Some("Maipú")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Home delivery to an address.
    Home {
        /// Street address.
        address: String,
    },
    /// Pickup at a store branch.
    Store {
        /// Branch name.
        branch: String,
    },
}

impl Destination {
    /// Combine a kind with optional address/branch, enforcing exclusivity.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::AddressOnly`] for home delivery without an
    /// address or with a branch, and [`DestinationError::BranchOnly`] for store
    /// pickup without a branch or with an address.
    pub fn new(
        kind: DispatchKind,
        address: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Self, DestinationError> {
        let address = non_blank(address);
        let branch = non_blank(branch);

        match (kind, address, branch) {
            (DispatchKind::HomeDelivery, Some(address), None) => Ok(Self::Home {
                address: address.to_owned(),
            }),
            (DispatchKind::HomeDelivery, _, _) => Err(DestinationError::AddressOnly),
            (DispatchKind::StorePickup, None, Some(branch)) => Ok(Self::Store {
                branch: branch.to_owned(),
            }),
            (DispatchKind::StorePickup, _, _) => Err(DestinationError::BranchOnly),
        }
    }

    /// The dispatch kind implied by this destination.
    #[must_use]
    pub const fn kind(&self) -> DispatchKind {
        match self {
            Self::Home { .. } => DispatchKind::HomeDelivery,
            Self::Store { .. } => DispatchKind::StorePickup,
        }
    }

    /// The delivery address, for home delivery.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Home { address } => Some(address),
            Self::Store { .. } => None,
        }
    }

    /// The pickup branch, for store pickup.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Store { branch } => Some(branch),
            Self::Home { .. } => None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for DispatchKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DispatchKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for DispatchKind {
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
    fn test_parse_known_kinds() {
        assert_eq!(
            "entrega domicilio".parse::<DispatchKind>().unwrap(),
            DispatchKind::HomeDelivery
        );
        assert_eq!(
            "retiro en tienda".parse::<DispatchKind>().unwrap(),
            DispatchKind::StorePickup
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("drone".parse::<DispatchKind>(), Err(DispatchKindError));
        assert_eq!("Retiro En Tienda".parse::<DispatchKind>(), Err(DispatchKindError));
    }

    #[test]
    fn test_destination_home_requires_address_only() {
        let home = Destination::new(DispatchKind::HomeDelivery, Some(" Los Aromos 45 "), None);
        assert_eq!(
            home.unwrap(),
            Destination::Home {
                address: "Los Aromos 45".to_owned()
            }
        );

        assert_eq!(
            Destination::new(DispatchKind::HomeDelivery, None, None),
            Err(DestinationError::AddressOnly)
        );
        assert_eq!(
            Destination::new(DispatchKind::HomeDelivery, None, Some("Centro")),
            Err(DestinationError::AddressOnly)
        );
        assert_eq!(
            Destination::new(DispatchKind::HomeDelivery, Some("Los Aromos 45"), Some("Centro")),
            Err(DestinationError::AddressOnly)
        );
    }

    #[test]
    fn test_destination_store_requires_branch_only() {
        let store = Destination::new(DispatchKind::StorePickup, Some(""), Some("Maipú")).unwrap();
        assert_eq!(store.kind(), DispatchKind::StorePickup);
        assert_eq!(store.branch(), Some("Maipú"));
        assert_eq!(store.address(), None);

        assert_eq!(
            Destination::new(DispatchKind::StorePickup, Some("Los Aromos 45"), None),
            Err(DestinationError::BranchOnly)
        );
        assert_eq!(
            Destination::new(DispatchKind::StorePickup, None, Some("   ")),
            Err(DestinationError::BranchOnly)
        );
    }

    #[test]
    fn test_serde_names_match_database() {
        let json = serde_json::to_string(&DispatchKind::StorePickup).unwrap();
        assert_eq!(json, "\"retiro en tienda\"");
    }
}
