pub mod api;
pub mod app;
pub mod calendar;
pub mod completion;
pub mod config;
pub mod dashboard;
pub mod date_window;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod mutator;
pub mod reconciler;
pub mod ui;
pub mod state;
pub mod view;

pub use api::{HttpApi, RoutineApi};
pub use app::router;
pub use config::Config;
pub use dashboard::Dashboard;
pub use errors::ClientError;
pub use state::AppState;
