//! Authentication service.
//!
//! Client self-registration, administrative worker creation, login and
//! password changes. Every password goes through the shared
//! [`CredentialHasher`].

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use ferremas_core::{CommuneId, Email, Phone, Role, Rut};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User, UserSummary};
use crate::services::password::CredentialHasher;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Parsed registration data shared by clients and workers.
#[derive(Debug, Clone)]
pub struct Registration {
    pub rut: Rut,
    pub nombre: String,
    pub apellido: String,
    pub email: Email,
    pub telefono: Option<Phone>,
    pub clave: String,
    pub id_comuna: Option<CommuneId>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    hasher: &'a CredentialHasher,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hasher: &'a CredentialHasher) -> Self {
        Self {
            users: UserRepository::new(pool),
            hasher,
        }
    }

    /// Login with email and password.
    ///
    /// A malformed email, an unknown email and a wrong password all fail the
    /// same way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(row) = self.users.get_with_password_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &row.clave) {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(rut = %row.user.rut, "User logged in");
        Ok(row.user.into())
    }

    /// Self-registration: always creates a `cliente`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::Validation` if no commune is given.
    /// Returns `AuthError::Repository` with `Conflict` if the email or RUT is taken.
    pub async fn register_client(&self, registration: Registration) -> Result<User, AuthError> {
        self.register(registration, Role::Cliente, false).await
    }

    /// Administrative creation of a staff account.
    ///
    /// The new account must change its password on first use.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for the `cliente` role or a missing
    /// commune on a role that needs one.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::Repository` with `Conflict` if the email or RUT is taken.
    pub async fn register_worker(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<User, AuthError> {
        if !role.is_staff() {
            return Err(AuthError::Validation(
                "No se puede asignar el rol cliente desde este endpoint".to_owned(),
            ));
        }

        self.register(registration, role, true).await
    }

    async fn register(
        &self,
        registration: Registration,
        role: Role,
        must_change_password: bool,
    ) -> Result<User, AuthError> {
        validate_password(&registration.clave)?;

        if role.requires_commune() && registration.id_comuna.is_none() {
            return Err(AuthError::Validation("Debe indicar una comuna".to_owned()));
        }

        let password_hash = self.hasher.hash(&registration.clave)?;

        let user = self
            .users
            .create(&NewUser {
                rut: registration.rut,
                nombre: registration.nombre,
                apellido: registration.apellido,
                email: registration.email,
                telefono: registration.telefono,
                password_hash,
                rol: role,
                id_comuna: registration.id_comuna,
                cambio_clave_obligatorio: must_change_password,
            })
            .await?;

        tracing::info!(rut = %user.rut, rol = %user.rol, "User registered");
        Ok(user)
    }

    /// Set a new password and clear the mandatory-change flag.
    ///
    /// When `current` is given (the user changing their own password) it
    /// must match the stored hash. Without it the change is administrative.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    /// Returns `AuthError::InvalidCredentials` if `current` doesn't match.
    /// Returns `AuthError::Repository` with `NotFound` if the user doesn't exist.
    pub async fn change_password(
        &self,
        rut: &Rut,
        current: Option<&str>,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        if let Some(current) = current {
            let stored = self
                .users
                .get_password_hash(rut)
                .await?
                .ok_or(RepositoryError::NotFound)?;

            if !self.hasher.verify(current, &stored) {
                return Err(AuthError::InvalidCredentials);
            }
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.users.set_password(rut, &password_hash).await?;

        tracing::info!(%rut, self_service = current.is_some(), "Password changed");
        Ok(())
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` when the password is shorter than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "La clave debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }

    Ok(())
}
