//! Application services - Use case implementations

mod health_service;
mod search_coordinator;
mod site_search_service;

pub use health_service::{HealthConfig, HealthReport, HealthService, ServiceHealth};
pub use search_coordinator::{Published, QueryTicket, SearchCoordinator};
pub use site_search_service::{
    CandidateFailure, FailureReason, SearchError, SearchReport, SearchRequest, SiteSearchConfig,
    SiteSearchService,
};
