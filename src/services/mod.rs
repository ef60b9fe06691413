//! Business logic services

pub mod catalog;
pub mod loans;
pub mod marketplace;
pub mod reports;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all application services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub marketplace: marketplace::MarketplaceService,
    pub reports: reports::ReportsService,
}

impl Services {
    pub fn new(repository: Repository, config: Arc<AppConfig>) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), config.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.clone()),
            marketplace: marketplace::MarketplaceService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone()),
            repository,
        }
    }
}
