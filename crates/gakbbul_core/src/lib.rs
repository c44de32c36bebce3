pub mod description;
pub mod domain;
pub mod ports;
pub mod search;
pub mod subscription;
pub mod ui;

pub use description::{DescriptionGenerator, DescriptionOutcome, DisabledDescriptionService, FALLBACK_DESCRIPTION};
pub use domain::{NewSite, Site, SiteFormData};
pub use ports::{DescriptionGenerationService, PortError, PortResult, SiteRepository};
pub use subscription::{site_feed, SiteFeed, SiteSubscription};
