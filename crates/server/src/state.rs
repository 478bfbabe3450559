use crate::upstream::Upstream;
use headway::scenario::ScenarioStore;
use tokio::sync::RwLock;

pub struct AppState {
    pub upstream: Upstream,
    pub store: RwLock<ScenarioStore>,
}

impl AppState {
    pub fn new(upstream: Upstream, store: ScenarioStore) -> Self {
        Self {
            upstream,
            store: RwLock::new(store),
        }
    }
}
