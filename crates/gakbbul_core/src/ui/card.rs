//! The presentation of one site in the dashboard grid.

use uuid::Uuid;

use crate::domain::{with_default_scheme, Site};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCard {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    /// Where activating the card navigates, always with an http(s) scheme.
    pub target_url: String,
}

impl SiteCard {
    pub fn from_site(site: &Site) -> Self {
        Self {
            id: site.id,
            name: site.name.clone(),
            title: site.title.clone(),
            description: site.description.clone(),
            target_url: with_default_scheme(&site.url),
        }
    }
}
