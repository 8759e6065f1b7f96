//! Visit logging service: ownership, visibility and filtering rules

use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{Role, UserClaims},
        visit::{
            CreateVisit, FilterCriteria, SuggestionField, Suggestions, Visit, VisitStats, VisitType,
        },
    },
    repository::Repository,
};

use super::{filter, suggestions::SuggestionIndex};

#[derive(Clone)]
pub struct VisitsService {
    repository: Repository,
    /// Serialises read-modify-write cycles on the visit list
    write_lock: Arc<Mutex<()>>,
}

impl VisitsService {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Visits visible to the viewer that match the criteria, in stored order
    pub async fn list(
        &self,
        viewer: &UserClaims,
        criteria: &FilterCriteria,
    ) -> AppResult<Vec<Visit>> {
        let visits = self.repository.visits.load().await?;
        let visible = filter::visible_to(&visits, viewer);
        let matched: Vec<Visit> = filter::apply(visible, criteria).into_iter().cloned().collect();

        tracing::debug!(
            "{} ({}) listed {} of {} visits",
            viewer.sub,
            viewer.role,
            matched.len(),
            visits.len()
        );
        Ok(matched)
    }

    /// Get one visit, hidden visits are reported as missing
    pub async fn get(&self, viewer: &UserClaims, id: i32) -> AppResult<Visit> {
        let visits = self.repository.visits.load().await?;
        filter::visible_to(&visits, viewer)
            .into_iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Visit with id {} not found", id)))
    }

    /// Log a new visit on behalf of the viewer
    pub async fn create(&self, viewer: &UserClaims, data: CreateVisit) -> AppResult<Visit> {
        data.validate()?;

        let vendor = match viewer.role {
            // A salesperson always logs under their own name
            Role::Vendor => viewer.name.clone(),
            Role::Admin => data
                .vendor
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Validation("Vendor is required".to_string()))?,
        };

        let visit = Visit {
            id: 0,
            date: data.date.trim().to_string(),
            visit_type: data
                .visit_type
                .filter(|t| *t != VisitType::Unspecified)
                .ok_or_else(|| AppError::Validation("Visit type is required".to_string()))?,
            client: data.client,
            vendor,
            manager: data.manager,
            division: data.division,
            status: data.status.unwrap_or_default(),
            details: data.details,
        };

        let _guard = self.write_lock.lock().await;
        let created = self.repository.visits.append(visit).await?;
        tracing::info!(
            "Visit {} logged by {} for client {}",
            created.id,
            viewer.sub,
            created.client
        );
        Ok(created)
    }

    /// Replace the whole visit list (admin import)
    pub async fn replace_all(&self, viewer: &UserClaims, visits: Vec<Visit>) -> AppResult<usize> {
        viewer.require_admin()?;

        let mut seen = HashSet::new();
        if let Some(dup) = visits.iter().find(|v| !seen.insert(v.id)) {
            return Err(AppError::Validation(format!(
                "Duplicate visit id {}",
                dup.id
            )));
        }

        let _guard = self.write_lock.lock().await;
        self.repository.visits.replace_all(&visits).await?;
        tracing::info!("{} replaced the visit list ({} visits)", viewer.sub, visits.len());
        Ok(visits.len())
    }

    /// Suggestion index over the visits the viewer may see
    pub async fn suggestion_index(&self, viewer: &UserClaims) -> AppResult<SuggestionIndex> {
        let visits = self.repository.visits.load().await?;
        Ok(SuggestionIndex::derive(filter::visible_to(&visits, viewer)))
    }

    /// All distinct vendors, clients and managers
    pub async fn suggestions(&self, viewer: &UserClaims) -> AppResult<Suggestions> {
        Ok(self.suggestion_index(viewer).await?.to_suggestions())
    }

    /// Candidates for one filter field given what has been typed
    pub async fn narrow_suggestions(
        &self,
        viewer: &UserClaims,
        field: SuggestionField,
        typed: &str,
    ) -> AppResult<Vec<String>> {
        Ok(self.suggestion_index(viewer).await?.narrow(field, typed))
    }

    /// Counters over the visits the viewer may see
    pub async fn stats(&self, viewer: &UserClaims) -> AppResult<VisitStats> {
        let visits = self.repository.visits.load().await?;
        Ok(VisitStats::from_visits(filter::visible_to(&visits, viewer)))
    }
}
