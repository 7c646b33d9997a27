//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Login, registration and password changes
//! - `password` - Argon2id credential hashing
//! - `users` - Full and partial user updates
//! - `payments` - Payment registration rules
//! - `dispatch` - Dispatch registration and updates
//!
//! Services take already-parsed domain types, enforce the rules that span
//! fields (role vs commune, address vs branch, payment type range) and hand
//! off to the repositories in `crate::db`.

pub mod auth;
pub mod dispatch;
pub mod password;
pub mod payments;
pub mod users;

pub use auth::{AuthError, AuthService, Registration};
pub use dispatch::{DispatchPatch, DispatchService};
pub use password::{CredentialHasher, HashError};
pub use payments::PaymentService;
pub use users::{UserChanges, UserPatch, UserService};
