//! Application state shared by handlers

use std::sync::Arc;

use crate::infrastructure::services::ResponseService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<ResponseService>,
}

impl AppState {
    pub fn new(service: Arc<ResponseService>) -> Self {
        Self { service }
    }
}
