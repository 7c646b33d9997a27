//! Core domain types for Ferremas.
//!
//! Every type here validates on construction, so a value that exists is a
//! value the database is allowed to hold.

pub mod amount;
pub mod dispatch;
pub mod email;
pub mod id;
pub mod phone;
pub mod role;
pub mod rut;

pub use amount::{Amount, AmountError};
pub use dispatch::{Destination, DestinationError, DispatchKind, DispatchKindError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use role::{Role, RoleError};
pub use rut::{Rut, RutError};
