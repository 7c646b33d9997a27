//! Administrator account commands.
//!
//! # Usage
//!
//! ```bash
//! ferremas-cli admin create --rut 12345678-5 --nombre Ana --apellido Rojas \
//!     --email ana@ferremas.cl [--telefono 912345678]
//! ```
//!
//! The account gets a random password, printed once, and must change it on
//! first login.
//!
//! # Environment Variables
//!
//! - `FERREMAS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `FERREMAS_HASH_*` - Argon2 cost parameters, as for the API

use ferremas_api::config::{ConfigError, HashingConfig};
use ferremas_api::db::{RepositoryError, create_pool};
use ferremas_api::services::auth::{AuthError, AuthService, Registration};
use ferremas_api::services::password::{CredentialHasher, HashError};
use ferremas_core::{Email, EmailError, Phone, PhoneError, Role, Rut, RutError};
use rand::{Rng, distr::Alphanumeric};
use thiserror::Error;

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: FERREMAS_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid RUT: {0}")]
    InvalidRut(#[from] RutError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("Could not create administrator: {0}")]
    Auth(AuthError),
}

impl From<AuthError> for AdminError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Repository(RepositoryError::Conflict(msg)) => Self::UserExists(msg),
            other => Self::Auth(other),
        }
    }
}

/// Details for a new administrator.
#[derive(Debug)]
pub struct NewAdmin<'a> {
    pub rut: &'a str,
    pub nombre: &'a str,
    pub apellido: &'a str,
    pub email: &'a str,
    pub telefono: Option<&'a str>,
}

/// Generate a random alphanumeric password.
fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

fn registration(admin: &NewAdmin<'_>, clave: String) -> Result<Registration, AdminError> {
    Ok(Registration {
        rut: Rut::parse(admin.rut)?,
        nombre: admin.nombre.trim().to_owned(),
        apellido: admin.apellido.trim().to_owned(),
        email: Email::parse(admin.email)?,
        telefono: admin.telefono.map(Phone::parse).transpose()?,
        clave,
        id_comuna: None,
    })
}

/// Create an administrator with a generated password.
///
/// # Returns
///
/// The generated plaintext password, to hand to the new administrator.
///
/// # Errors
///
/// Returns `AdminError` for invalid input, a taken RUT/email or database
/// failures.
pub async fn create(admin: &NewAdmin<'_>) -> Result<String, AdminError> {
    let password = generate_password();
    let registration = registration(admin, password.clone())?;

    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;
    let hasher = CredentialHasher::new(&HashingConfig::from_env()?)?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url, 1).await?;

    let user = AuthService::new(&pool, &hasher)
        .register_worker(registration, Role::Administrador)
        .await?;

    tracing::info!(rut = %user.rut, email = %user.email, "Administrator created");
    Ok(password)
}
