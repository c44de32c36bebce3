//! services/api/src/web/admin_task.rs
//!
//! Background workers for the admin panel's store and description calls.
//!
//! Each worker runs detached from the connection loop so a slow backend never
//! blocks rendering. Its result travels back over the connection's outcome
//! channel together with the panel ticket it was issued under.

use crate::web::state::AppState;
use gakbbul_core::description::DescriptionOutcome;
use gakbbul_core::domain::{Site, SiteFormData};
use gakbbul_core::ports::PortResult;
use gakbbul_core::ui::PanelTicket;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// The result of one admin operation, as delivered to the connection loop.
#[derive(Debug)]
pub enum TaskOutcome {
    Described {
        ticket: PanelTicket,
        outcome: DescriptionOutcome,
    },
    Added {
        ticket: PanelTicket,
        result: PortResult<Site>,
    },
    Deleted {
        ticket: PanelTicket,
        result: PortResult<()>,
    },
}

async fn deliver(outcomes: mpsc::Sender<TaskOutcome>, outcome: TaskOutcome) {
    if outcomes.send(outcome).await.is_err() {
        info!("Connection closed before an admin operation finished; result discarded.");
    }
}

pub fn spawn_describe(
    app_state: Arc<AppState>,
    ticket: PanelTicket,
    title: String,
    url: String,
    outcomes: mpsc::Sender<TaskOutcome>,
) {
    tokio::spawn(async move {
        let outcome = app_state.describer.generate(&title, &url).await;
        deliver(outcomes, TaskOutcome::Described { ticket, outcome }).await;
    });
}

pub fn spawn_add(
    app_state: Arc<AppState>,
    ticket: PanelTicket,
    form: SiteFormData,
    outcomes: mpsc::Sender<TaskOutcome>,
) {
    tokio::spawn(async move {
        let result = app_state.repository.add(form).await;
        match &result {
            Ok(site) => info!("Added site {} ({})", site.id, site.name),
            Err(e) => error!("Error adding site: {:?}", e),
        }
        deliver(outcomes, TaskOutcome::Added { ticket, result }).await;
    });
}

pub fn spawn_delete(
    app_state: Arc<AppState>,
    ticket: PanelTicket,
    id: Uuid,
    outcomes: mpsc::Sender<TaskOutcome>,
) {
    tokio::spawn(async move {
        let result = app_state.repository.delete(id).await;
        match &result {
            Ok(()) => info!("Deleted site {}", id),
            Err(e) => error!("Error deleting site {}: {:?}", id, e),
        }
        deliver(outcomes, TaskOutcome::Deleted { ticket, result }).await;
    });
}
