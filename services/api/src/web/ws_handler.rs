//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! One connection is one page session: it owns a `Dashboard`, which owns the
//! live site subscription, and it drives the admin panel state machine.

use crate::error::ApiError;
use crate::web::{
    admin_task::{spawn_add, spawn_delete, spawn_describe, TaskOutcome},
    protocol::{ClientMessage, ServerMessage},
    session::{session_cookie, session_id_from_headers, SessionRegistry},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use gakbbul_core::domain::SiteFormData;
use gakbbul_core::ui::{
    admin::{DELETE_CONFIRM_PROMPT, MISSING_FIELDS_ALERT},
    AdminRejection, Completion, Dashboard, SessionContext, UnlockOutcome,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

type WsSender = SplitSink<WebSocket, Message>;

/// The handler for upgrading HTTP requests to WebSocket connections.
///
/// Issues the session cookie on the upgrade response when the browser has none.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let existing = session_id_from_headers(&headers);
    let issued = existing.is_none();
    let session_id = existing.unwrap_or_else(SessionRegistry::new_session_id);

    // The unlock flag is read once, before the first render.
    let context = app_state.sessions.context(&session_id).await;

    let cookie = session_cookie(&session_id);
    let mut response =
        ws.on_upgrade(move |socket| handle_socket(socket, app_state, session_id, context));

    if issued {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }
    response
}

async fn handle_socket(
    socket: WebSocket,
    app_state: Arc<AppState>,
    session_id: String,
    context: SessionContext,
) {
    info!("New WebSocket connection established for session: {}", session_id);

    let (mut sender, mut receiver) = socket.split();
    let mut dashboard = Dashboard::new(context, app_state.config.admin_lock_policy);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<TaskOutcome>(16);

    // --- 1. Initialization Phase ---
    if dashboard.is_unlocked() {
        attach_subscription(&app_state, &mut dashboard).await;
    }
    if let Err(e) = send_all(&mut sender, render(&dashboard)).await {
        error!("Failed to send initial view: {:?}", e);
        return;
    }

    // --- 2. Main Event Loop ---
    loop {
        let outgoing = tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_text_message(
                        text.as_str(),
                        &app_state,
                        &session_id,
                        &mut dashboard,
                        &outcome_tx,
                    )
                    .await
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("WebSocket receive failed: {:?}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            },
            snapshot = dashboard.next_snapshot() => match snapshot {
                Some(sites) => {
                    dashboard.apply_snapshot(sites);
                    render_lists(&dashboard)
                }
                None => continue,
            },
            Some(outcome) = outcome_rx.recv() => apply_outcome(&mut dashboard, outcome),
        };

        if let Err(e) = send_all(&mut sender, outgoing).await {
            error!("Failed to send update to client: {:?}", e);
            break;
        }
    }

    // --- 3. Cleanup ---
    // Dropping the dashboard releases the live subscription.
    drop(dashboard);
    info!("WebSocket connection closed for session: {}", session_id);
}

async fn attach_subscription(app_state: &Arc<AppState>, dashboard: &mut Dashboard) {
    match app_state.repository.subscribe().await {
        Ok(subscription) => dashboard.attach(subscription),
        Err(e) => error!("Failed to subscribe to sites; the list will stay empty: {:?}", e),
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: &str,
    app_state: &Arc<AppState>,
    session_id: &str,
    dashboard: &mut Dashboard,
    outcome_tx: &mpsc::Sender<TaskOutcome>,
) -> Vec<ServerMessage> {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return vec![ServerMessage::Error {
                message: "Malformed message.".to_string(),
            }];
        }
    };

    if let ClientMessage::Unlock { password } = client_msg {
        return match dashboard.unlock(&password, &app_state.config.app_password) {
            UnlockOutcome::Unlocked => {
                info!("Dashboard unlocked for session: {}", session_id);
                app_state.sessions.mark_unlocked(session_id).await;
                attach_subscription(app_state, dashboard).await;
                render(dashboard)
            }
            UnlockOutcome::AlreadyUnlocked => render(dashboard),
            UnlockOutcome::Rejected => vec![dashboard.lock_view().into()],
        };
    }

    // Everything past the lock screen needs an unlocked dashboard.
    if !dashboard.is_unlocked() {
        return vec![dashboard.lock_view().into()];
    }

    match client_msg {
        ClientMessage::Unlock { .. } => Vec::new(),
        ClientMessage::Search { query } => {
            dashboard.set_query(query);
            vec![dashboard.grid().into()]
        }
        ClientMessage::OpenSite { id } => match dashboard.open_site(id) {
            Some(url) => vec![ServerMessage::Navigate {
                url,
                new_context: true,
            }],
            None => vec![ServerMessage::Error {
                message: format!("Unknown site {}", id),
            }],
        },
        ClientMessage::OpenAdmin => {
            dashboard.admin_mut().open();
            vec![dashboard.admin_view().into()]
        }
        ClientMessage::CloseAdmin => {
            dashboard.admin_mut().close();
            vec![ServerMessage::AdminClosed]
        }
        ClientMessage::AdminUnlock { password } => {
            let admin_password = &app_state.config.admin_password;
            match dashboard.admin_mut().authenticate(&password, admin_password) {
                Ok(true) => info!("Admin panel unlocked for session: {}", session_id),
                Ok(false) => {}
                Err(rejection) => {
                    debug!("Admin unlock ignored: {}", rejection);
                    return Vec::new();
                }
            }
            vec![dashboard.admin_view().into()]
        }
        ClientMessage::EditForm {
            url,
            title,
            description,
        } => {
            let form = SiteFormData {
                url,
                title,
                description,
            };
            if let Err(rejection) = dashboard.admin_mut().edit_form(form) {
                debug!("Form edit ignored: {}", rejection);
            }
            Vec::new()
        }
        ClientMessage::GenerateDescription => match dashboard.admin_mut().begin_generate() {
            Ok((ticket, title, url)) => {
                spawn_describe(app_state.clone(), ticket, title, url, outcome_tx.clone());
                vec![dashboard.admin_view().into()]
            }
            Err(AdminRejection::MissingFields) => vec![ServerMessage::Alert {
                message: MISSING_FIELDS_ALERT.to_string(),
            }],
            Err(rejection) => {
                debug!("Description request ignored: {}", rejection);
                Vec::new()
            }
        },
        ClientMessage::SubmitSite => match dashboard.admin_mut().begin_submit() {
            Ok((ticket, form)) => {
                spawn_add(app_state.clone(), ticket, form, outcome_tx.clone());
                vec![dashboard.admin_view().into()]
            }
            Err(rejection) => {
                debug!("Submit ignored: {}", rejection);
                Vec::new()
            }
        },
        ClientMessage::RequestDelete { id } => match dashboard.admin_mut().request_delete(id) {
            Ok(()) => {
                let title = dashboard
                    .site(id)
                    .map(|site| site.title.clone())
                    .unwrap_or_default();
                vec![ServerMessage::ConfirmDelete {
                    id,
                    title,
                    prompt: DELETE_CONFIRM_PROMPT.to_string(),
                }]
            }
            Err(rejection) => {
                debug!("Delete request ignored: {}", rejection);
                Vec::new()
            }
        },
        ClientMessage::ConfirmDelete => match dashboard.admin_mut().confirm_delete() {
            Ok((ticket, id)) => {
                spawn_delete(app_state.clone(), ticket, id, outcome_tx.clone());
                Vec::new()
            }
            Err(rejection) => {
                debug!("Delete confirmation ignored: {}", rejection);
                Vec::new()
            }
        },
        ClientMessage::CancelDelete => {
            dashboard.admin_mut().cancel_delete();
            Vec::new()
        }
    }
}

/// Applies a finished admin operation. Only the panel it was issued from reports failures.
fn apply_outcome(dashboard: &mut Dashboard, outcome: TaskOutcome) -> Vec<ServerMessage> {
    let admin = dashboard.admin_mut();
    let completion = match outcome {
        TaskOutcome::Described { ticket, outcome } => admin.finish_generate(ticket, outcome),
        TaskOutcome::Added { ticket, result } => admin.finish_submit(ticket, &result),
        TaskOutcome::Deleted { ticket, result } => admin.finish_delete(ticket, &result),
    };

    match completion {
        Completion::Discarded => {
            info!("Admin operation finished after its panel was closed.");
            if dashboard.admin().is_open() {
                vec![dashboard.admin_view().into()]
            } else {
                Vec::new()
            }
        }
        Completion::Applied => vec![dashboard.admin_view().into()],
        Completion::Alert(message) => vec![
            dashboard.admin_view().into(),
            ServerMessage::Alert {
                message: message.to_string(),
            },
        ],
    }
}

/// The full view for the current state.
fn render(dashboard: &Dashboard) -> Vec<ServerMessage> {
    if !dashboard.is_unlocked() {
        return vec![dashboard.lock_view().into()];
    }
    render_lists(dashboard)
}

/// The views that depend on the site list.
fn render_lists(dashboard: &Dashboard) -> Vec<ServerMessage> {
    let mut messages = vec![dashboard.grid().into()];
    if dashboard.admin().is_open() {
        messages.push(dashboard.admin_view().into());
    }
    messages
}

async fn send_all(sender: &mut WsSender, messages: Vec<ServerMessage>) -> Result<(), ApiError> {
    for msg in messages {
        let json = serde_json::to_string(&msg).map_err(|e| ApiError::Internal(e.to_string()))?;
        sender.send(Message::Text(json.into())).await?;
    }
    Ok(())
}
