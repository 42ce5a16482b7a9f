pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use routes::router as app;
pub use state::AppState;
