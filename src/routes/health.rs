use actix_web::{get, HttpResponse, Responder};

/// Liveness probe. Needs no authentication and does not touch the store.
#[get("/status")]
pub async fn status() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
