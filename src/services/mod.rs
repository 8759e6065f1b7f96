//! Business logic services

pub mod auth;
pub mod filter;
pub mod suggestions;
pub mod visits;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub visits: visits::VisitsService,
}

impl Services {
    /// Create all services with the given repository and seed default users
    pub async fn new(repository: Repository, auth_config: AuthConfig) -> AppResult<Self> {
        let auth = auth::AuthService::new(repository.clone(), auth_config);
        auth.ensure_seeded().await?;

        Ok(Self {
            auth,
            visits: visits::VisitsService::new(repository.clone()),
            repository,
        })
    }
}
