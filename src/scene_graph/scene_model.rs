use std::sync::Arc;

use id_arena::Id;

use crate::{model::Model, rendering::render_model::RenderModelId};

pub type SceneModelId = Id<SceneModel>;

pub struct SceneModel {
    pub model: Arc<Model>,
    /// Set once the renderer has uploaded the model's buffers.
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            model,
            render_model: None,
        }
    }
}
