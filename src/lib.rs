pub mod config;
pub mod constants;
pub mod engagement;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
pub mod validation;
pub mod workers;
