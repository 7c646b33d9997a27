//! End-to-end tests for dispatch records.
//!
//! Run with: `cargo test -p ferremas-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use ferremas_integration_tests::{TestContext, detail};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_dispatch_switches_from_delivery_to_pickup() {
    let ctx = TestContext::new();
    let user = ctx.register_client().await;

    let resp = ctx
        .client
        .post(ctx.url("/despacho"))
        .json(&json!({
            "rut_usuario": user.rut,
            "tipo": "entrega domicilio",
            "direccion": "Av. Matta 123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    // Switching kind without clearing the address leaves both set.
    let resp = ctx
        .client
        .patch(ctx.url(&format!("/despacho/{id}")))
        .json(&json!({ "tipo": "retiro en tienda", "sucursal": "Maipú" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/despacho/{id}")))
        .json(&json!({ "tipo": "retiro en tienda", "direccion": null, "sucursal": "Maipú" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let records: Value = ctx
        .client
        .get(ctx.url(&format!("/despacho/usuario/{}", user.rut)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let record = records.as_array().unwrap().first().unwrap();
    assert_eq!(record["tipo"], "retiro en tienda");
    assert!(record["direccion"].is_null());
    assert_eq!(record["sucursal"], "Maipú");

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/despacho/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.delete_user(&user.rut).await;
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_patch_unknown_dispatch() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .patch(ctx.url("/despacho/999999999"))
        .json(&json!({ "direccion": "Calle Falsa 123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(resp).await, "Despacho no encontrado");
}
