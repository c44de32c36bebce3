//! crates/gakbbul_core/src/ui/dashboard.rs
//!
//! The main dashboard: the application lock screen, the cached site list fed by
//! the live subscription, the search box and the admin modal.

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Site;
use crate::search::filter_sites;
use crate::subscription::SiteSubscription;
use crate::ui::admin::{AdminLockPolicy, AdminPanel, AdminView};
use crate::ui::card::SiteCard;

pub const APP_PASSWORD_ERROR: &str = "접근 권한이 없습니다.";

/// Per-session state read once when a dashboard is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// Whether the application lock screen was already passed in this browser session.
    pub app_unlocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The password matched; the caller should subscribe and persist the flag.
    Unlocked,
    AlreadyUnlocked,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockView {
    pub error: Option<&'static str>,
    /// The password input must be emptied after a rejected attempt.
    pub clear_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub query: String,
    pub cards: Vec<SiteCard>,
    /// Set whenever no card is visible, whether the list is empty or nothing matched.
    pub empty: bool,
}

pub struct Dashboard {
    unlocked: bool,
    lock_error: Option<&'static str>,
    query: String,
    sites: Vec<Site>,
    subscription: Option<SiteSubscription>,
    admin: AdminPanel,
}

impl Dashboard {
    pub fn new(context: SessionContext, admin_policy: AdminLockPolicy) -> Self {
        Self {
            unlocked: context.app_unlocked,
            lock_error: None,
            query: String::new(),
            sites: Vec::new(),
            subscription: None,
            admin: AdminPanel::new(admin_policy),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Compares `password` with the application secret by exact equality.
    pub fn unlock(&mut self, password: &str, secret: &str) -> UnlockOutcome {
        if self.unlocked {
            return UnlockOutcome::AlreadyUnlocked;
        }
        if password == secret {
            self.unlocked = true;
            self.lock_error = None;
            UnlockOutcome::Unlocked
        } else {
            self.lock_error = Some(APP_PASSWORD_ERROR);
            UnlockOutcome::Rejected
        }
    }

    /// Takes ownership of the live feed. A previous subscription is released first.
    pub fn attach(&mut self, subscription: SiteSubscription) {
        if let Some(previous) = self.subscription.replace(subscription) {
            previous.cancel();
        }
    }

    /// Leaves the unlocked state, releasing the live feed and the cached list.
    pub fn lock(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("Live subscription released.");
        }
        self.unlocked = false;
        self.sites.clear();
        self.admin.close();
    }

    /// Waits for the next pushed list. Never resolves while no subscription is attached.
    ///
    /// When the feed ends the subscription is dropped and the cached list goes stale.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Site>> {
        let subscription = match self.subscription.as_mut() {
            Some(subscription) => subscription,
            None => return std::future::pending().await,
        };
        let snapshot = subscription.next_snapshot().await;
        if snapshot.is_none() {
            warn!("Live subscription ended; the site list will no longer update.");
            self.subscription = None;
        }
        snapshot
    }

    pub fn apply_snapshot(&mut self, sites: Vec<Site>) {
        self.sites = sites;
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn lock_view(&self) -> LockView {
        LockView {
            error: self.lock_error,
            clear_password: self.lock_error.is_some(),
        }
    }

    pub fn grid(&self) -> GridView {
        let cards: Vec<SiteCard> = filter_sites(&self.sites, &self.query)
            .into_iter()
            .map(SiteCard::from_site)
            .collect();
        GridView {
            query: self.query.clone(),
            empty: cards.is_empty(),
            cards,
        }
    }

    /// Navigation target for activating the card of `id`.
    pub fn open_site(&self, id: Uuid) -> Option<String> {
        self.sites
            .iter()
            .find(|site| site.id == id)
            .map(|site| SiteCard::from_site(site).target_url)
    }

    pub fn site(&self, id: Uuid) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    pub fn admin(&self) -> &AdminPanel {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut AdminPanel {
        &mut self.admin
    }

    pub fn admin_view(&self) -> AdminView {
        self.admin.view(&self.sites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::site_feed;

    const SECRET: &str = "app-secret";

    fn site(title: &str, name: &str, created_at: i64) -> Site {
        Site {
            id: Uuid::new_v4(),
            url: format!("www.{}", name),
            title: title.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at,
        }
    }

    #[test]
    fn wrong_password_stays_locked_and_clears_input() {
        let mut dashboard = Dashboard::new(SessionContext::default(), AdminLockPolicy::default());
        assert_eq!(dashboard.unlock("guess", SECRET), UnlockOutcome::Rejected);
        assert!(!dashboard.is_unlocked());
        assert_eq!(
            dashboard.lock_view(),
            LockView {
                error: Some(APP_PASSWORD_ERROR),
                clear_password: true
            }
        );
    }

    #[test]
    fn unlock_succeeds_once() {
        let mut dashboard = Dashboard::new(SessionContext::default(), AdminLockPolicy::default());
        assert_eq!(dashboard.unlock(SECRET, SECRET), UnlockOutcome::Unlocked);
        assert_eq!(dashboard.unlock(SECRET, SECRET), UnlockOutcome::AlreadyUnlocked);
        assert_eq!(dashboard.lock_view().error, None);
    }

    #[test]
    fn session_context_skips_the_lock_screen() {
        let dashboard = Dashboard::new(
            SessionContext { app_unlocked: true },
            AdminLockPolicy::default(),
        );
        assert!(dashboard.is_unlocked());
    }

    #[test]
    fn grid_filters_by_query_and_reports_empty() {
        let mut dashboard = Dashboard::new(SessionContext { app_unlocked: true }, AdminLockPolicy::default());
        assert!(dashboard.grid().empty);

        dashboard.apply_snapshot(vec![site("Example", "example.com", 2), site("Docs", "docs.rs", 1)]);
        assert_eq!(dashboard.grid().cards.len(), 2);

        dashboard.set_query("EXAM".to_string());
        let grid = dashboard.grid();
        assert_eq!(grid.cards.len(), 1);
        assert_eq!(grid.cards[0].target_url, "https://www.example.com");

        dashboard.set_query("zzz".to_string());
        assert!(dashboard.grid().empty);
    }

    #[test]
    fn open_site_resolves_target_url() {
        let mut dashboard = Dashboard::new(SessionContext { app_unlocked: true }, AdminLockPolicy::default());
        let example = site("Example", "example.com", 1);
        let id = example.id;
        dashboard.apply_snapshot(vec![example]);
        assert_eq!(dashboard.open_site(id).as_deref(), Some("https://www.example.com"));
        assert!(dashboard.open_site(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn snapshots_flow_through_the_attached_subscription() {
        let mut dashboard = Dashboard::new(SessionContext { app_unlocked: true }, AdminLockPolicy::default());
        let (feed, subscription) = site_feed();
        dashboard.attach(subscription);

        assert!(feed.publish(vec![site("Example", "example.com", 1)]).await);
        let snapshot = dashboard.next_snapshot().await.unwrap();
        dashboard.apply_snapshot(snapshot);
        assert_eq!(dashboard.sites().len(), 1);

        dashboard.lock();
        feed.cancelled().await;
        assert!(!dashboard.is_subscribed());
        assert!(dashboard.sites().is_empty());
    }

    #[tokio::test]
    async fn dropping_the_dashboard_releases_the_subscription() {
        let mut dashboard = Dashboard::new(SessionContext { app_unlocked: true }, AdminLockPolicy::default());
        let (feed, subscription) = site_feed();
        dashboard.attach(subscription);
        drop(dashboard);
        feed.cancelled().await;
        assert!(feed.is_cancelled());
    }

    #[tokio::test]
    async fn ended_feed_detaches_the_subscription() {
        let mut dashboard = Dashboard::new(SessionContext { app_unlocked: true }, AdminLockPolicy::default());
        let (feed, subscription) = site_feed();
        dashboard.attach(subscription);
        drop(feed);
        assert!(dashboard.next_snapshot().await.is_none());
        assert!(!dashboard.is_subscribed());
    }
}
