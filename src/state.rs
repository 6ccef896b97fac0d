use crate::dashboard::Dashboard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub login_url: String,
}

impl AppState {
    pub fn new(dashboard: Dashboard, login_url: impl Into<String>) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            login_url: login_url.into(),
        }
    }
}
