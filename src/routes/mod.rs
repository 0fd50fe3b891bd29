pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, Error, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

fn bad_request<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers every `/api` route. Mount it under `web::scope("/api")`.
///
/// Expects `web::Data<TaskRepository>` and `web::Data<TokenService>` in the
/// app data. Only the `/tasks` scope requires an access token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(bad_request))
        .app_data(web::QueryConfig::default().error_handler(bad_request))
        .app_data(web::PathConfig::default().error_handler(bad_request))
        .service(health::status)
        .service(auth::login)
        .service(auth::refresh)
        .service(auth::register)
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
