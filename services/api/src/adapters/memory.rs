//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `SiteRepository` port. Used when no
//! `DATABASE_URL` is configured, and by the test suites.

use std::sync::Arc;

use async_trait::async_trait;
use gakbbul_core::domain::{now_millis, NewSite, Site, SiteFormData};
use gakbbul_core::ports::{PortError, PortResult, SiteRepository};
use gakbbul_core::subscription::{site_feed, sort_newest_first, SiteFeed, SiteSubscription};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct MemorySiteRepository {
    sites: Arc<Mutex<Vec<Site>>>,
    changes: broadcast::Sender<()>,
}

impl Default for MemorySiteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySiteRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            sites: Arc::new(Mutex::new(Vec::new())),
            changes,
        }
    }

    async fn snapshot(&self) -> Vec<Site> {
        self.sites.lock().await.clone()
    }

    async fn run_feed(self, feed: SiteFeed, mut changes: broadcast::Receiver<()>) {
        if !feed.publish(self.snapshot().await).await {
            return;
        }
        loop {
            tokio::select! {
                _ = feed.cancelled() => break,
                change = changes.recv() => {
                    match change {
                        Ok(()) => {}
                        // Missed signals collapse into one refresh.
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Site feed lagged behind {} changes", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                    if !feed.publish(self.snapshot().await).await {
                        break;
                    }
                }
            }
        }
        info!("Site subscription released.");
    }
}

#[async_trait]
impl SiteRepository for MemorySiteRepository {
    async fn subscribe(&self) -> PortResult<SiteSubscription> {
        let (feed, subscription) = site_feed();
        let changes = self.changes.subscribe();
        tokio::spawn(self.clone().run_feed(feed, changes));
        Ok(subscription)
    }

    async fn add(&self, form: SiteFormData) -> PortResult<Site> {
        let site = NewSite::from_form(form, now_millis())?.into_site(Uuid::new_v4());
        {
            let mut sites = self.sites.lock().await;
            sites.insert(0, site.clone());
            sort_newest_first(&mut sites);
        }
        let _ = self.changes.send(());
        Ok(site)
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        {
            let mut sites = self.sites.lock().await;
            let before = sites.len();
            sites.retain(|site| site.id != id);
            if sites.len() == before {
                return Err(PortError::NotFound(format!("Site {} not found", id)));
            }
        }
        let _ = self.changes.send(());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(url: &str, title: &str) -> SiteFormData {
        SiteFormData {
            url: url.to_string(),
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn add_derives_name_and_stamps_time() {
        let repo = MemorySiteRepository::new();
        let before = now_millis();
        let site = repo.add(form("www.example.com", "Example")).await.unwrap();
        assert_eq!(site.name, "example.com");
        assert!(site.created_at >= before);
    }

    #[tokio::test]
    async fn add_rejects_unparseable_url() {
        let repo = MemorySiteRepository::new();
        let err = repo.add(form("exa mple.com", "Broken")).await.unwrap_err();
        assert!(matches!(err, PortError::InvalidUrl(_)));
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn subscription_pushes_initial_list_and_every_change() {
        let repo = MemorySiteRepository::new();
        let first = repo.add(form("first.com", "First")).await.unwrap();

        let mut subscription = repo.subscribe().await.unwrap();
        let initial = subscription.next_snapshot().await.unwrap();
        assert_eq!(initial, vec![first.clone()]);

        let second = repo.add(form("second.com", "Second")).await.unwrap();
        let after_add = subscription.next_snapshot().await.unwrap();
        assert_eq!(after_add.len(), 2);
        assert_eq!(after_add[0].id, second.id);
        assert!(after_add
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));

        repo.delete(first.id).await.unwrap();
        let after_delete = subscription.next_snapshot().await.unwrap();
        assert_eq!(after_delete, vec![second]);
    }

    #[tokio::test]
    async fn deleting_unknown_id_is_not_found() {
        let repo = MemorySiteRepository::new();
        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancelled_subscription_stops_receiving() {
        let repo = MemorySiteRepository::new();
        let subscription = repo.subscribe().await.unwrap();
        subscription.cancel();

        // Changes after cancellation must not fail the writer.
        repo.add(form("example.com", "Example")).await.unwrap();
        assert_eq!(repo.snapshot().await.len(), 1);
    }
}
