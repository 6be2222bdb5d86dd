//! Web server module
//!
//! Configures and starts the Actix-Web HTTP server exposing the planning
//! endpoints, with CORS and request logging middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;

use crate::application::use_cases::PlanningRunner;
use crate::web::handlers;

/// Network settings of the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Starts the web server with the given configuration
///
/// Routes:
/// - `GET /health` - liveness probe
/// - `GET /calculate_planning/{duration}` - start a run in the background
/// - `POST /calculate_order_date` - reserved, acknowledges only
pub async fn start_web_server(
    config: ServerConfig,
    runner: Arc<dyn PlanningRunner>,
) -> std::io::Result<()> {
    info!("Starting web server on {}:{}", config.host, config.port);

    let runner_data = web::Data::new(runner);
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(runner_data.clone())
            .route("/health", web::get().to(handlers::health_check))
            .route(
                "/calculate_planning/{duration}",
                web::get().to(handlers::calculate_planning),
            )
            .route(
                "/calculate_order_date",
                web::post().to(handlers::calculate_order_date),
            )
    })
    .bind((config.host.as_str(), config.port))?;

    info!("Web server started successfully");
    server.run().await
}
