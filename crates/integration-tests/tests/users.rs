//! End-to-end tests for user registration, login and maintenance.
//!
//! These tests require a migrated database and a running `ferremas-api`.
//! Run with: `cargo test -p ferremas-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use ferremas_integration_tests::{TEST_PASSWORD, TestContext, TestUser, detail};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_register_then_fetch_client() {
    let ctx = TestContext::new();
    let user = ctx.register_client().await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/usuarios/{}", user.rut)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], user.email.as_str());
    assert_eq!(body["rol"], "cliente");
    assert_eq!(body["cambio_clave_obligatorio"], false);
    assert!(body.get("clave").is_none());

    ctx.delete_user(&user.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_duplicate_email_is_rejected() {
    let ctx = TestContext::new();
    let first = ctx.register_client().await;

    let mut second = TestUser::fresh();
    second.email = first.email.clone();
    let resp = ctx
        .client
        .post(ctx.url("/usuarios/registro-cliente"))
        .json(&second.registration_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "Email ya registrado");

    ctx.delete_user(&first.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let ctx = TestContext::new();
    let user = ctx.register_client().await;

    let wrong = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", user.email.as_str()), ("clave", "incorrecta-1")])
        .send()
        .await
        .unwrap();
    let unknown = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", "nadie@ferremas.test"), ("clave", "incorrecta-1")])
        .send()
        .await
        .unwrap();

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(detail(wrong).await, detail(unknown).await);

    let ok = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", user.email.as_str()), ("clave", TEST_PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["rut"], user.rut.as_str());

    ctx.delete_user(&user.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_patch_and_password_change() {
    let ctx = TestContext::new();
    let user = ctx.register_client().await;

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/usuarios/modificar/{}", user.rut)))
        .json(&json!({ "nombre": "Renombrado", "telefono": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = ctx
        .client
        .get(ctx.url(&format!("/usuarios/{}", user.rut)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["nombre"], "Renombrado");
    assert!(body["telefono"].is_null());

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/usuarios/modificar-clave/{}", user.rut)))
        .json(&json!({ "clave_actual": "no-es-esta", "clave_nueva": "otra-clave-456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/usuarios/modificar-clave/{}", user.rut)))
        .json(&json!({ "clave_actual": TEST_PASSWORD, "clave_nueva": "otra-clave-456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", user.email.as_str()), ("clave", "otra-clave-456")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.delete_user(&user.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_delete_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let ghost = TestUser::fresh();

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/usuarios/eliminar/{}", ghost.rut)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_duplicate_rut_is_rejected() {
    let ctx = TestContext::new();
    let first = ctx.register_client().await;

    let mut second = TestUser::fresh();
    second.rut = first.rut.clone();
    let resp = ctx
        .client
        .post(ctx.url("/usuarios/registro-cliente"))
        .json(&second.registration_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "RUT ya registrado");

    ctx.delete_user(&first.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_unknown_commune_is_bad_request() {
    let ctx = TestContext::new();
    let user = TestUser::fresh();
    let mut body = user.registration_body();
    body["id_comuna"] = json!(999);

    let resp = ctx
        .client
        .post(ctx.url("/usuarios/registro-cliente"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "Comuna no encontrada");
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_worker_must_change_password_until_reset() {
    let ctx = TestContext::new();
    let worker = TestUser::fresh();

    let resp = ctx
        .client
        .post(ctx.url("/usuarios/registro-trabajador"))
        .json(&worker.worker_body("vendedor"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["rol"], "vendedor");

    let summary: Value = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", worker.email.as_str()), ("clave", TEST_PASSWORD)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["rol"], "vendedor");
    assert_eq!(summary["cambio_clave_obligatorio"], true);

    // Admin-initiated reset: no current password.
    let resp = ctx
        .client
        .patch(ctx.url(&format!("/usuarios/modificar-clave/{}", worker.rut)))
        .json(&json!({ "clave_nueva": "nueva-clave-789" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let summary: Value = ctx
        .client
        .get(ctx.url("/usuarios/login"))
        .query(&[("email", worker.email.as_str()), ("clave", "nueva-clave-789")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["cambio_clave_obligatorio"], false);

    ctx.delete_user(&worker.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_patch_to_taken_email_is_rejected() {
    let ctx = TestContext::new();
    let first = ctx.register_client().await;
    let second = ctx.register_client().await;

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/usuarios/modificar/{}", second.rut)))
        .json(&json!({ "email": first.email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "Email ya registrado");

    let body: Value = ctx
        .client
        .get(ctx.url(&format!("/usuarios/{}", second.rut)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["email"], second.email.as_str());

    ctx.delete_user(&first.rut).await;
    ctx.delete_user(&second.rut).await;
}
