use axum::Router;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;


/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// Extractor handlers use to reach [SharedData]
pub type AppState = State<Arc<SharedData>>;

/// Assembles every route of the application, plus the API documentation and request tracing
pub fn build_router(shared_data: SharedData) -> Router {
    let router = Router::new()
        .merge(api::account::account_routes())
        .nest("/todos", api::todo::todo_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(Arc::new(shared_data));

    logging::attach_tracing_http(router)
}
