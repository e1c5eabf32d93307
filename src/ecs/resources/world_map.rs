use std::ops::Deref;

use bevy_ecs::resource::Resource;

use crate::model::{TileGraph, WorldGraph};

/// The world graph collaborator, shared read-only by all systems.
#[derive(Resource)]
pub struct WorldMap(Box<dyn WorldGraph + Send + Sync>);

impl WorldMap {
    pub fn new(graph: impl WorldGraph + Send + Sync + 'static) -> Self {
        Self(Box::new(graph))
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::new(TileGraph::new())
    }
}

impl Deref for WorldMap {
    type Target = dyn WorldGraph + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
