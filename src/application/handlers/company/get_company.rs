//! GetCompanyHandler - Query handler for a company by id.

use std::sync::Arc;

use crate::application::handlers::lookup::require_company;
use crate::application::services::CompanyCache;
use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError};

/// Query to fetch a company.
#[derive(Debug, Clone)]
pub struct GetCompanyQuery {
    pub company_id: CompanyId,
}

pub struct GetCompanyHandler {
    companies: Arc<CompanyCache>,
}

impl GetCompanyHandler {
    pub fn new(companies: Arc<CompanyCache>) -> Self {
        Self { companies }
    }

    pub async fn handle(&self, query: GetCompanyQuery) -> Result<Company, DomainError> {
        require_company(&self.companies, &query.company_id).await
    }
}
