//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod password;

use secrecy::SecretString;

/// Read the database URL, preferring `FERREMAS_DATABASE_URL` over `DATABASE_URL`.
///
/// Returns `None` when neither is set.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("FERREMAS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
