//! Client-side substring search over the cached site list.

use crate::domain::Site;

/// True when `query` occurs in the site's title, name or description, ignoring case.
pub fn matches_query(site: &Site, query: &str) -> bool {
    let needle = query.to_lowercase();
    [&site.title, &site.name, &site.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Keeps the sites matching `query`, preserving their order. An empty query keeps everything.
pub fn filter_sites<'a>(sites: &'a [Site], query: &str) -> Vec<&'a Site> {
    if query.is_empty() {
        return sites.iter().collect();
    }
    sites.iter().filter(|site| matches_query(site, query)).collect()
}
