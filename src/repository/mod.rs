//! Repository layer over the key-value store

pub mod store;
pub mod users;
pub mod visits;

use std::sync::Arc;

use store::KeyValueStore;

/// Main repository struct holding the key-value store
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn KeyValueStore>,
    pub users: users::UsersRepository,
    pub visits: visits::VisitsRepository,
}

impl Repository {
    /// Create a new repository on top of the given store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            users: users::UsersRepository::new(store.clone()),
            visits: visits::VisitsRepository::new(store.clone()),
            store,
        }
    }
}
