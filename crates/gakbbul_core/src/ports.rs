//! crates/gakbbul_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete document store and text-generation backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Site, SiteFormData};
use crate::subscription::SiteSubscription;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The "sites" collection of the document store.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Opens a live feed of the whole collection, newest first.
    ///
    /// The first snapshot is the current list; every later add or delete yields
    /// the full updated list. Dropping or cancelling the subscription releases
    /// the underlying connection.
    async fn subscribe(&self) -> PortResult<SiteSubscription>;

    /// Derives the site name, stamps the creation time and persists a new site.
    async fn add(&self, form: SiteFormData) -> PortResult<Site>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait DescriptionGenerationService: Send + Sync {
    /// Generates a short description for a site from its title and url.
    async fn generate_description(&self, title: &str, url: &str) -> PortResult<String>;
}
