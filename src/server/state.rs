use std::sync::Arc;

use crate::features::pipeline::PipelineService;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineService>,
}

impl AppState {
    pub fn new(pipeline: Arc<PipelineService>) -> Self {
        Self { pipeline }
    }
}
