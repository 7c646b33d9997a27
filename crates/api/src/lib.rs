//! Ferremas API library.
//!
//! The binary in `main.rs` only wires configuration, tracing and the
//! listener; everything routable lives here so it can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the full application router with tracing and request IDs.
///
/// Sentry layers are added by the binary, outermost.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::password::tests::fast_hasher;

    /// State whose pool never connects: any request that reaches the
    /// database fails with a 500, so a 4xx proves validation ran first.
    fn offline_state() -> AppState {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(50))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        AppState::with_hasher(pool, fast_hasher())
    }

    async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app(offline_state())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn client_body() -> Value {
        json!({
            "rut": "11111111-1",
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": "a@x.com",
            "telefono": "912345678",
            "clave": "clave-segura",
            "id_comuna": 1
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(offline_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_reports_unavailable_database() {
        let response = app(offline_state())
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_register_client_rejects_short_phone() {
        let mut body = client_body();
        body["telefono"] = json!("91234");

        let (status, json) = send("POST", "/usuarios/registro-cliente", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El teléfono debe tener exactamente 9 dígitos");
    }

    #[tokio::test]
    async fn test_register_client_rejects_short_password() {
        let mut body = client_body();
        body["clave"] = json!("corta");

        let (status, _) = send("POST", "/usuarios/registro-cliente", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_worker_rejects_cliente_role() {
        let mut body = client_body();
        body["rol"] = json!("cliente");

        let (status, json) = send("POST", "/usuarios/registro-trabajador", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].as_str().unwrap().contains("cliente"));
    }

    #[tokio::test]
    async fn test_register_worker_requires_commune_for_staff() {
        let mut body = client_body();
        body["rol"] = json!("vendedor");
        body["id_comuna"] = Value::Null;

        let (status, json) = send("POST", "/usuarios/registro-trabajador", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Debe indicar una comuna");
    }

    #[tokio::test]
    async fn test_register_worker_rejects_unknown_role() {
        let mut body = client_body();
        body["rol"] = json!("gerente");

        let (status, json) = send("POST", "/usuarios/registro-trabajador", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Rol inválido: gerente");
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let (status, json) = send("PATCH", "/usuarios/modificar/11111111-1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Debe enviar al menos 1 dato");
    }

    #[tokio::test]
    async fn test_patch_rejects_null_for_required_field() {
        let (status, json) = send(
            "PATCH",
            "/usuarios/modificar/11111111-1",
            Some(json!({ "email": null })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El campo email no puede ser nulo");
    }

    #[tokio::test]
    async fn test_patch_rejects_non_whitelisted_field() {
        let (status, json) = send(
            "PATCH",
            "/usuarios/modificar/11111111-1",
            Some(json!({ "clave": "nueva-clave" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_rut_in_path() {
        let (status, json) = send("GET", "/usuarios/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El RUT debe tener el formato 12345678-9");
    }

    #[tokio::test]
    async fn test_rut_with_wrong_check_digit() {
        let mut body = client_body();
        body["rut"] = json!("11111111-2");

        let (status, json) = send("POST", "/usuarios/registro-cliente", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El dígito verificador del RUT no es válido");
    }

    #[tokio::test]
    async fn test_login_without_parameters_is_unauthorized() {
        let (status, json) = send("GET", "/usuarios/login?email=a@x.com", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, json!({ "detail": "Credenciales inválidas" }));
    }

    #[tokio::test]
    async fn test_payment_amount_must_be_positive() {
        let (status, json) = send(
            "POST",
            "/pagos",
            Some(json!({ "rut_usuario": "11111111-1", "id_tipo_pago": 1, "monto": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El monto debe ser mayor a cero");
    }

    #[tokio::test]
    async fn test_payment_amount_must_fit_column() {
        let (status, json) = send(
            "POST",
            "/pagos",
            Some(json!({ "rut_usuario": "11111111-1", "id_tipo_pago": 1, "monto": "99999999999.99" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El monto debe ser menor a 10000000000");

        let (status, json) = send(
            "POST",
            "/pagos",
            Some(json!({ "rut_usuario": "11111111-1", "id_tipo_pago": 1, "monto": "10.999" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "El monto admite como máximo 2 decimales");
    }

    #[tokio::test]
    async fn test_payment_type_out_of_range() {
        let (status, json) = send(
            "POST",
            "/pagos",
            Some(json!({ "rut_usuario": "11111111-1", "id_tipo_pago": 7, "monto": "15990" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "ID de tipo de pago inválido");
    }

    #[tokio::test]
    async fn test_dispatch_rejects_unknown_type() {
        let (status, json) = send(
            "POST",
            "/despacho",
            Some(json!({ "rut_usuario": "11111111-1", "tipo": "dron" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Tipo de despacho inválido");
    }

    #[tokio::test]
    async fn test_dispatch_home_delivery_rejects_branch() {
        let (status, json) = send(
            "POST",
            "/despacho",
            Some(json!({
                "rut_usuario": "11111111-1",
                "tipo": "entrega domicilio",
                "direccion": "Los Aromos 45",
                "sucursal": "Centro"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["detail"],
            "Debe proporcionar solo una dirección para entrega a domicilio"
        );
    }

    #[tokio::test]
    async fn test_dispatch_store_pickup_requires_branch() {
        let (status, json) = send(
            "POST",
            "/despacho",
            Some(json!({ "rut_usuario": "11111111-1", "tipo": "retiro en tienda", "sucursal": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["detail"],
            "Debe proporcionar solo una sucursal para retiro en tienda"
        );
    }

    #[tokio::test]
    async fn test_dispatch_empty_patch_is_rejected() {
        let (status, json) = send("PATCH", "/despacho/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Debe enviar al menos 1 dato");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let (status, json) = send("DELETE", "/pagos/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Identificador inválido");
    }

    #[tokio::test]
    async fn test_database_failure_is_generic_500() {
        let (status, json) = send("GET", "/usuarios", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "Error interno del servidor");
    }
}
