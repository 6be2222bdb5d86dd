//! HTTP request handlers module
//!
//! The two planning endpoints of the service. Scheduling runs for minutes,
//! so the calculation handler only schedules the run as a background task
//! and acknowledges immediately.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use tracing::{error, info};

use crate::application::use_cases::PlanningRunner;
use crate::web::models::{ApiResponse, StartedResponse};

/// Health check endpoint
///
/// Returns OK status to indicate the server is running.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("OK"))
}

/// Starts a scheduling run in the background
///
/// `GET /calculate_planning/{duration}` hands the wall-clock budget in
/// seconds to the runner on a blocking worker thread and returns at once.
pub async fn calculate_planning(
    path: web::Path<u64>,
    runner: web::Data<Arc<dyn PlanningRunner>>,
) -> HttpResponse {
    let duration = path.into_inner();
    let runner = runner.get_ref().clone();
    info!("Scheduling calculate_planning({}) in the background", duration);

    actix_web::rt::spawn(async move {
        let result = web::block(move || runner.run(duration)).await;
        match result {
            Ok(Ok(())) => info!("Background planning run finished"),
            Ok(Err(e)) => error!("Background planning run failed: {}", e),
            Err(e) => error!("Background planning task panicked: {}", e),
        }
    });

    HttpResponse::Ok().json(StartedResponse {
        message: "Planning calculation started in background.".to_string(),
    })
}

/// Reserved endpoint for order-date calculation
///
/// `POST /calculate_order_date` is currently a no-op and only acknowledges.
pub async fn calculate_order_date() -> HttpResponse {
    HttpResponse::Ok().json(StartedResponse {
        message: "Order date calculation started in background.".to_string(),
    })
}
