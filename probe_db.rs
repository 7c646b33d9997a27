#![allow(clippy::unwrap_used)]
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use ferremas_api::config::HashingConfig;
use ferremas_api::services::password::CredentialHasher;
use ferremas_api::state::AppState;

const URL: &str = "postgres://postgres@127.0.0.1:55432/postgres";

async fn state() -> AppState {
    let hashing = HashingConfig { memory_kib: Some(1024), iterations: Some(1), parallelism: Some(1) };
    let pool = sqlx::postgres::PgPoolOptions::new().connect(URL).await.unwrap();
    AppState::with_hasher(pool, CredentialHasher::new(&hashing).unwrap())
}

async fn send(st: &AppState, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
    let mut b = Request::builder().method(method).uri(uri);
    let body = match body { Some(j) => { b = b.header("content-type", "application/json"); Body::from(j.to_string()) } None => Body::empty() };
    let r = ferremas_api::app(st.clone()).oneshot(b.body(body).unwrap()).await.unwrap();
    let s = r.status().as_u16();
    let bytes = r.into_body().collect().await.unwrap().to_bytes();
    (s, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn probe_all() {
    let st = state().await;
    let r = send(&st, "POST", "/usuarios/registro-cliente", Some(json!({"rut":"22222222-2","nombre":"A","apellido":"B","email":"c@x.com","telefono":"912345678","clave":"clave-segura","id_comuna":999}))).await;
    println!("PROBE unknown commune on registro-cliente: {r:?}");
    let r = send(&st, "POST", "/usuarios/registro-cliente", Some(json!({"rut":"11111111-1","nombre":"A","apellido":"B","email":"a@x.com","telefono":"912345678","clave":"clave-segura","id_comuna":1}))).await;
    println!("PROBE register: {r:?}");
    let r = send(&st, "GET", "/usuarios/11111111-1", None).await;
    println!("PROBE get: {r:?}");
    let r = send(&st, "POST", "/usuarios/registro-cliente", Some(json!({"rut":"33333333-3","nombre":"A","apellido":"B","email":"A@x.com","clave":"clave-segura","id_comuna":1}))).await;
    println!("PROBE dup email: {r:?}");
    let r = send(&st, "POST", "/usuarios/registro-trabajador", Some(json!({"rut":"44444444-4","nombre":"W","apellido":"B","email":"w@x.com","clave":"clave-segura","rol":"administrador"}))).await;
    println!("PROBE worker: {r:?}");
    let r = send(&st, "GET", "/usuarios/login?email=w@x.com&clave=clave-segura", None).await;
    println!("PROBE worker login: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar-clave/44444444-4", Some(json!({"clave_nueva":"nueva-clave-1"}))).await;
    println!("PROBE chpw: {r:?}");
    let r = send(&st, "GET", "/usuarios/login?email=w@x.com&clave=nueva-clave-1", None).await;
    println!("PROBE worker login2: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/44444444-4", Some(json!({"rol":"vendedor"}))).await;
    println!("PROBE patch role needing commune: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/55555555-5", Some(json!({"nombre":"x"}))).await;
    println!("PROBE patch missing: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/11111111-1", Some(json!({"email":"w@x.com"}))).await;
    println!("PROBE patch dup email: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/11111111-1", Some(json!({"id_comuna":42}))).await;
    println!("PROBE patch bad commune: {r:?}");
    let r = send(&st, "POST", "/pagos", Some(json!({"rut_usuario":"11111111-1","id_tipo_pago":1,"monto":"99999999999.99"}))).await;
    println!("PROBE big amount: {r:?}");
    let r = send(&st, "POST", "/pagos", Some(json!({"rut_usuario":"11111111-1","id_tipo_pago":1,"monto":"0.001"}))).await;
    println!("PROBE tiny amount: {r:?}");
    let r = send(&st, "POST", "/pagos", Some(json!({"rut_usuario":"11111111-1","id_tipo_pago":1,"monto":1500}))).await;
    println!("PROBE pay: {r:?}");
    let r = send(&st, "GET", "/pagos", None).await;
    println!("PROBE list pay: {r:?}");
    let r = send(&st, "POST", "/pagos", Some(json!({"rut_usuario":"99999999-9","id_tipo_pago":1,"monto":1500}))).await;
    println!("PROBE pay unknown user: {r:?}");
    let r = send(&st, "DELETE", "/pagos/9999", None).await;
    println!("PROBE del missing pay: {r:?}");
    let r = send(&st, "POST", "/despacho", Some(json!({"rut_usuario":"11111111-1","tipo":"entrega domicilio","direccion":"Calle 1"}))).await;
    println!("PROBE disp: {r:?}");
    let r = send(&st, "PATCH", "/despacho/1", Some(json!({"tipo":"retiro en tienda","direccion":null,"sucursal":"Centro"}))).await;
    println!("PROBE disp patch: {r:?}");
    let r = send(&st, "GET", "/despacho/usuario/11111111-1", None).await;
    println!("PROBE disp list: {r:?}");
    let r = send(&st, "PATCH", "/despacho/1", Some(json!({"direccion":"x"}))).await;
    println!("PROBE disp patch bad: {r:?}");
    let r = send(&st, "GET", "/usuarios/email/A@X.com", None).await;
    println!("PROBE by email: {r:?}");
    let r = send(&st, "GET", "/comunas/3", None).await;
    println!("PROBE commune: {r:?}");
    let r = send(&st, "POST", "/pagos", Some(json!({"rut_usuario":"11111111-1","id_tipo_pago":1,"monto":"9999999999.99"}))).await;
    println!("PROBE max amount: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/11111111-1", Some(json!({"telefono":"12345678"}))).await;
    println!("PROBE patch short phone: {r:?}");
    let r = send(&st, "PATCH", "/usuarios/modificar/11111111-1", Some(json!({"rol":"jefe"}))).await;
    println!("PROBE patch bad role: {r:?}");
    let r = send(&st, "GET", "/usuarios/login?email=nobody@x.com&clave=clave-segura", None).await;
    println!("PROBE login unknown: {r:?}");
    let r = send(&st, "GET", "/usuarios/login?email=a@x.com&clave=wrongwrong", None).await;
    println!("PROBE login wrong pw: {r:?}");
    let r = send(&st, "GET", "/pagos/usuario/33333333-3", None).await;
    println!("PROBE pay by user none: {r:?}");
    let r = send(&st, "DELETE", "/despacho/9999", None).await;
    println!("PROBE del missing disp: {r:?}");
    let r = send(&st, "DELETE", "/usuarios/eliminar/11111111-1", None).await;
    println!("PROBE delete user w/ deps: {r:?}");
}
