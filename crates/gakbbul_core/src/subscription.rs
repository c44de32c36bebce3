//! crates/gakbbul_core/src/subscription.rs
//!
//! The live subscription primitive shared by every `SiteRepository` adapter.
//!
//! An adapter creates a `(SiteFeed, SiteSubscription)` pair with [`site_feed`],
//! keeps the feed inside the task that watches the store, and hands the
//! subscription to the caller. The subscription is the cancellation handle:
//! dropping it (or calling [`SiteSubscription::cancel`]) cancels the shared
//! token, which the producer task observes to release its store connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::Site;

const FEED_CAPACITY: usize = 16;

/// Creates a connected producer/consumer pair for one live subscription.
pub fn site_feed() -> (SiteFeed, SiteSubscription) {
    let (tx, rx) = mpsc::channel(FEED_CAPACITY);
    let token = CancellationToken::new();
    (
        SiteFeed {
            updates: tx,
            token: token.clone(),
        },
        SiteSubscription { updates: rx, token },
    )
}

/// Orders sites the way every snapshot is delivered: newest `created_at` first.
///
/// The sort is stable, so sites sharing a timestamp keep their relative order.
pub fn sort_newest_first(sites: &mut [Site]) {
    sites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// The producer half, owned by the adapter task that watches the store.
pub struct SiteFeed {
    updates: mpsc::Sender<Vec<Site>>,
    token: CancellationToken,
}

impl SiteFeed {
    /// Pushes a full snapshot. Returns `false` once the subscriber is gone.
    pub async fn publish(&self, sites: Vec<Site>) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            sent = self.updates.send(sites) => sent.is_ok(),
        }
    }

    /// Resolves when the subscriber cancels or drops its handle.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = self.updates.closed() => {}
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.updates.is_closed()
    }
}

/// A live feed of the full site list, newest first.
///
/// Released exactly once: either through [`cancel`](Self::cancel), which
/// consumes the handle, or when the handle is dropped.
pub struct SiteSubscription {
    updates: mpsc::Receiver<Vec<Site>>,
    token: CancellationToken,
}

impl SiteSubscription {
    /// Waits for the next snapshot. `None` means the producer stopped.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Site>> {
        if self.token.is_cancelled() {
            return None;
        }
        self.updates.recv().await
    }

    /// Stops further deliveries and releases the underlying connection.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for SiteSubscription {
    fn drop(&mut self) {
        self.token.cancel();
        self.updates.close();
    }
}

impl Stream for SiteSubscription {
    type Item = Vec<Site>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.updates.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use uuid::Uuid;

    fn site(title: &str, created_at: i64) -> Site {
        Site {
            id: Uuid::new_v4(),
            url: format!("{}.com", title),
            title: title.to_string(),
            name: format!("{}.com", title),
            description: String::new(),
            created_at,
        }
    }

    #[tokio::test]
    async fn snapshots_arrive_in_publish_order() {
        let (feed, mut subscription) = site_feed();
        assert!(feed.publish(vec![site("a", 1)]).await);
        assert!(feed.publish(vec![site("b", 2), site("a", 1)]).await);

        assert_eq!(subscription.next_snapshot().await.unwrap().len(), 1);
        assert_eq!(subscription.next().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn dropping_the_subscription_releases_the_feed() {
        let (feed, subscription) = site_feed();
        assert!(!feed.is_cancelled());

        drop(subscription);

        feed.cancelled().await;
        assert!(feed.is_cancelled());
        assert!(!feed.publish(vec![site("late", 3)]).await);
    }

    #[tokio::test]
    async fn cancel_consumes_the_handle() {
        let (feed, subscription) = site_feed();
        subscription.cancel();
        feed.cancelled().await;
        assert!(!feed.publish(Vec::new()).await);
    }

    #[tokio::test]
    async fn subscription_ends_when_producer_stops() {
        let (feed, mut subscription) = site_feed();
        drop(feed);
        assert!(subscription.next_snapshot().await.is_none());
    }

    #[test]
    fn sort_is_newest_first_and_stable() {
        let mut sites = vec![site("old", 1), site("new", 3), site("tie-a", 2), site("tie-b", 2)];
        sort_newest_first(&mut sites);
        let titles: Vec<_> = sites.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "tie-a", "tie-b", "old"]);
    }
}
