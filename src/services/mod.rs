//! Business logic services

pub mod auth;
pub mod catalog;
pub mod directory;
pub mod ledger;
pub mod stats;

use crate::{
    config::{AuthConfig, LoanConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub directory: directory::DirectoryService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loan_config: LoanConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            directory: directory::DirectoryService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), loan_config),
            stats: stats::StatsService::new(repository),
        }
    }
}
