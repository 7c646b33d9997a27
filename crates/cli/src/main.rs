//! Ferremas CLI - Database migrations and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ferremas-cli migrate
//!
//! # Create an administrator (prints a one-time password)
//! ferremas-cli admin create --rut 12345678-5 --nombre Ana --apellido Rojas --email ana@ferremas.cl
//!
//! # Hash a password read from stdin
//! echo 'secreto123' | ferremas-cli hash-password
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ferremas-cli")]
#[command(author, version, about = "Ferremas CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Hash a password read from stdin with the configured Argon2 parameters
    HashPassword,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator with a generated password
    Create {
        /// Chilean RUT, e.g. 12345678-5
        #[arg(long)]
        rut: String,

        #[arg(long)]
        nombre: String,

        #[arg(long)]
        apellido: String,

        #[arg(short, long)]
        email: String,

        /// Nine-digit phone number
        #[arg(short, long)]
        telefono: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                rut,
                nombre,
                apellido,
                email,
                telefono,
            } => {
                let admin = commands::admin::NewAdmin {
                    rut: &rut,
                    nombre: &nombre,
                    apellido: &apellido,
                    email: &email,
                    telefono: telefono.as_deref(),
                };
                let password = commands::admin::create(&admin).await?;
                println!("Administrator {rut} created.");
                println!("Temporary password (shown once, must be changed on first login): {password}");
            }
        },
        Commands::HashPassword => commands::password::run()?,
    }
    Ok(())
}
