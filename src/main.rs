use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use timetrack::auth::{prepare_decoy, SigningKeys, TokenService};
use timetrack::config::Config;
use timetrack::routes;
use timetrack::store::PgTaskStore;
use timetrack::TaskRepository;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    let store = match PgTaskStore::connect(&config.database_url, config.store_timeout).await {
        Ok(store) => store,
        Err(e) => {
            error!("failed to connect to database: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    let repo = web::Data::new(TaskRepository::with_timeout(
        Arc::new(store),
        config.store_timeout,
    ));
    let tokens = web::Data::new(TokenService::new(SigningKeys::from_config(&config)));
    if !prepare_decoy() {
        warn!("login decoy hash unavailable; unknown emails fall back to hashing");
    }

    info!("Starting timetrack server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(repo.clone())
            .app_data(tokens.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
