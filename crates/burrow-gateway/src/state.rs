use std::sync::Arc;

use burrow_core::Registry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn Registry>,
    pub public_url: String,
    pub demo: bool,
    pub copy: Option<String>,
}

impl AppState {
    pub fn new(registry: Arc<dyn Registry>, public_url: impl Into<String>) -> Self {
        Self {
            registry,
            public_url: public_url.into().trim_end_matches('/').to_string(),
            demo: false,
            copy: None,
        }
    }

    pub fn with_demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    pub fn with_copy(mut self, copy: Option<String>) -> Self {
        self.copy = copy.filter(|c| !c.is_empty());
        self
    }
}
