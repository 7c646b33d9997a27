//! Integration tests for the Ferremas API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the server
//! ferremas-cli migrate
//! cargo run -p ferremas-api
//!
//! # Run the ignored end-to-end tests against it
//! FERREMAS_API_URL=http://127.0.0.1:8000 cargo test -p ferremas-integration-tests -- --ignored
//! ```
//!
//! Every test creates its own users with fresh RUTs and emails, so runs do not
//! collide with each other or with existing data.

use ferremas_core::{Email, Phone, Rut};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the API under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("FERREMAS_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_owned())
}

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "clave-segura-123";

/// HTTP client plus the API base URL.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

/// A client account registered for one test.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub rut: Rut,
    pub email: Email,
    pub telefono: Phone,
}

impl TestUser {
    /// Generate a user whose RUT, email and phone are unlikely to exist yet.
    #[must_use]
    pub fn fresh() -> Self {
        let n = Uuid::new_v4().as_u128();
        // Eight-digit body not starting with zero.
        let body = u32::try_from(10_000_000 + n % 90_000_000).unwrap_or(10_000_000);
        let check = Rut::check_digit(body);
        let phone = 900_000_000 + (n >> 32) % 100_000_000;

        Self {
            rut: Rut::parse(&format!("{body}-{check}")).unwrap_or_else(|e| panic!("rut: {e}")),
            email: Email::parse(&format!("it-{}@ferremas.test", Uuid::new_v4().simple()))
                .unwrap_or_else(|e| panic!("email: {e}")),
            telefono: Phone::parse(&phone.to_string()).unwrap_or_else(|e| panic!("phone: {e}")),
        }
    }

    /// Body for `POST /usuarios/registro-cliente`.
    #[must_use]
    pub fn registration_body(&self) -> Value {
        json!({
            "rut": self.rut,
            "nombre": "Prueba",
            "apellido": "Integración",
            "email": self.email,
            "telefono": self.telefono,
            "clave": TEST_PASSWORD,
            "id_comuna": 1,
        })
    }

    /// Body for `POST /usuarios/registro-trabajador` with the given role.
    #[must_use]
    pub fn worker_body(&self, rol: &str) -> Value {
        let mut body = self.registration_body();
        body["rol"] = json!(rol);
        body
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a fresh client account and return it.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the API rejects the registration.
    pub async fn register_client(&self) -> TestUser {
        let user = TestUser::fresh();
        let resp = self
            .client
            .post(self.url("/usuarios/registro-cliente"))
            .json(&user.registration_body())
            .send()
            .await
            .unwrap_or_else(|e| panic!("registration request failed: {e}"));
        assert!(
            resp.status().is_success(),
            "registration rejected: {}",
            resp.status()
        );
        user
    }

    /// Delete a user, ignoring the outcome. Used for cleanup.
    pub async fn delete_user(&self, rut: &Rut) {
        let _ = self
            .client
            .delete(self.url(&format!("/usuarios/eliminar/{rut}")))
            .send()
            .await;
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the `detail` field of an error response.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn detail(resp: Response) -> String {
    let body: Value = resp
        .json()
        .await
        .unwrap_or_else(|e| panic!("error body is not JSON: {e}"));
    body["detail"].as_str().unwrap_or_default().to_owned()
}
