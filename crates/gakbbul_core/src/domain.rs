//! crates/gakbbul_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use crate::ports::{PortError, PortResult};
use url::Url;
use uuid::Uuid;

/// A persisted bookmark entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    /// Hostname derived from `url` at creation time. Never re-derived.
    pub name: String,
    pub description: String,
    /// Epoch milliseconds, stamped by the client when the site is added.
    pub created_at: i64,
}

/// Transient input of the admin panel's add form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFormData {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl SiteFormData {
    /// Both `url` and `title` are needed before a site can be added or described.
    pub fn has_required_fields(&self) -> bool {
        !self.url.is_empty() && !self.title.is_empty()
    }
}

/// A site ready to be persisted: the form plus its derived fields, minus the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    pub url: String,
    pub title: String,
    pub name: String,
    pub description: String,
    pub created_at: i64,
}

impl NewSite {
    /// Derives `name` from the form's url and stamps `created_at`. The url is stored trimmed.
    pub fn from_form(form: SiteFormData, created_at: i64) -> PortResult<Self> {
        let url = form.url.trim().to_string();
        let name = derive_site_name(&url)?;
        Ok(Self {
            url,
            title: form.title,
            name,
            description: form.description,
            created_at,
        })
    }

    /// Attaches the identifier the store assigned.
    pub fn into_site(self, id: Uuid) -> Site {
        Site {
            id,
            url: self.url,
            title: self.title,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the trimmed `url` when it carries an http(s) scheme, otherwise prefixes `https://`.
pub fn with_default_scheme(url: &str) -> String {
    let url = url.trim();
    if has_http_scheme(url) {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Hostname of `url` after scheme normalization, with one leading `www.` removed.
pub fn derive_site_name(url: &str) -> PortResult<String> {
    let normalized = with_default_scheme(url);
    let parsed = Url::parse(&normalized)
        .map_err(|e| PortError::InvalidUrl(format!("{}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| PortError::InvalidUrl(format!("{}: missing host", url)))?;

    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
