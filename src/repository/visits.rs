//! Visit store: the persisted ordered list of visits

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::visit::Visit,
};

use super::store::KeyValueStore;

/// Key of the visit list record
pub const VISITS_KEY: &str = "visits";

#[derive(Clone)]
pub struct VisitsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl VisitsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted visits in stored order.
    ///
    /// A missing record loads as an empty list, and so does a payload that no
    /// longer parses. Only backend failures are reported.
    pub async fn load(&self) -> AppResult<Vec<Visit>> {
        let raw = self.store.get(VISITS_KEY).await?;
        match decode(raw.as_deref()) {
            Ok(visits) => Ok(visits),
            Err(e) => {
                tracing::warn!("Ignoring unreadable visits record: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the whole visit list
    pub async fn replace_all(&self, visits: &[Visit]) -> AppResult<()> {
        let payload = serde_json::to_string(visits)
            .map_err(|e| AppError::Internal(format!("Failed to serialize visits: {}", e)))?;
        self.store.set(VISITS_KEY, &payload).await
    }

    /// Assign an identifier, append and persist. Returns the stored visit.
    ///
    /// An existing record that does not parse is left untouched and the
    /// append fails, so stored visits are never silently dropped.
    pub async fn append(&self, mut visit: Visit) -> AppResult<Visit> {
        let raw = self.store.get(VISITS_KEY).await?;
        let mut visits = decode(raw.as_deref()).map_err(|e| {
            tracing::error!("Refusing to append over unreadable visits record: {}", e);
            AppError::Storage(format!("Stored visit list is unreadable: {}", e))
        })?;
        visit.id = next_id(&visits);
        visits.push(visit.clone());
        self.replace_all(&visits).await?;
        Ok(visit)
    }
}

fn decode(raw: Option<&str>) -> serde_json::Result<Vec<Visit>> {
    match raw {
        Some(raw) => serde_json::from_str(raw),
        None => Ok(Vec::new()),
    }
}

/// `count + 1`, moved past the current maximum if that identifier is taken
pub fn next_id(visits: &[Visit]) -> i32 {
    let candidate = visits.len() as i32 + 1;
    if visits.iter().any(|v| v.id == candidate) {
        visits.iter().map(|v| v.id).max().unwrap_or(0) + 1
    } else {
        candidate
    }
}
