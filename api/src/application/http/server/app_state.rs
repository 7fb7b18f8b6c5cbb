use std::sync::Arc;

use nutricheck_core::application::NutricheckService;

use crate::args::Args;

/// Built once at startup and shared read-only by every request. `service` is
/// `None` when the Gemini client could not be configured.
#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: Option<Arc<NutricheckService>>,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: Option<NutricheckService>) -> Self {
        Self {
            args,
            service: service.map(Arc::new),
        }
    }
}
