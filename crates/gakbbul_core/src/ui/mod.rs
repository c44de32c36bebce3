//! Headless state machines behind the lock screen, the site grid and the admin modal.

pub mod admin;
pub mod card;
pub mod dashboard;

pub use admin::{AdminEntry, AdminLockPolicy, AdminPanel, AdminRejection, AdminView, Completion, PanelTicket};
pub use card::SiteCard;
pub use dashboard::{Dashboard, GridView, LockView, SessionContext, UnlockOutcome};
