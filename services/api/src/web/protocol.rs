//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the bookmark dashboard, plus the JSON shapes shared with the REST endpoints.

use gakbbul_core::domain::SiteFormData;
use gakbbul_core::ui::{AdminEntry, AdminView, GridView, LockView, SiteCard};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits the application lock screen.
    Unlock { password: String },

    /// Replaces the search query of the grid.
    Search { query: String },

    /// Activates a site card.
    OpenSite { id: Uuid },

    OpenAdmin,
    CloseAdmin,

    /// Submits the admin password gate.
    AdminUnlock { password: String },

    /// Mirrors the add form after the user edits it.
    EditForm {
        url: String,
        title: String,
        #[serde(default)]
        description: String,
    },

    /// Asks for an AI-generated description of the site in the form.
    GenerateDescription,

    SubmitSite,

    /// Asks to delete a site. The server answers with a confirmation prompt.
    RequestDelete { id: Uuid },
    ConfirmDelete,
    CancelDelete,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The lock screen must be shown.
    Locked {
        error: Option<String>,
        clear_password: bool,
    },

    /// The visible grid. `empty` selects the single empty-state indicator.
    Grid {
        query: String,
        cards: Vec<SiteCardDto>,
        empty: bool,
    },

    AdminClosed,

    AdminLocked { error: Option<String> },

    AdminView {
        sites: Vec<AdminEntryDto>,
        count: usize,
        form: SiteFormDto,
        submitting: bool,
        generating: bool,
        /// The description was filled with the fallback text after a failed generation.
        generated_by_fallback: bool,
    },

    /// The client must ask the user to confirm deleting `id`.
    ConfirmDelete { id: Uuid, title: String, prompt: String },

    /// A blocking alert.
    Alert { message: String },

    /// Open `url`; `new_context` asks for a new browsing context without opener.
    Navigate { url: String, new_context: bool },

    Error { message: String },
}

//=========================================================================================
// Shared Payload Structs
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct SiteCardDto {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    pub target_url: String,
}

impl From<SiteCard> for SiteCardDto {
    fn from(card: SiteCard) -> Self {
        Self {
            id: card.id,
            name: card.name,
            title: card.title,
            description: card.description,
            target_url: card.target_url,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AdminEntryDto {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

impl From<AdminEntry> for AdminEntryDto {
    fn from(entry: AdminEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            url: entry.url,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SiteFormDto {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl From<SiteFormData> for SiteFormDto {
    fn from(form: SiteFormData) -> Self {
        Self {
            url: form.url,
            title: form.title,
            description: form.description,
        }
    }
}

//=========================================================================================
// View Conversions
//=========================================================================================

impl From<LockView> for ServerMessage {
    fn from(view: LockView) -> Self {
        ServerMessage::Locked {
            error: view.error.map(str::to_string),
            clear_password: view.clear_password,
        }
    }
}

impl From<GridView> for ServerMessage {
    fn from(view: GridView) -> Self {
        ServerMessage::Grid {
            query: view.query,
            cards: view.cards.into_iter().map(SiteCardDto::from).collect(),
            empty: view.empty,
        }
    }
}

impl From<AdminView> for ServerMessage {
    fn from(view: AdminView) -> Self {
        match view {
            AdminView::Closed => ServerMessage::AdminClosed,
            AdminView::Locked { error } => ServerMessage::AdminLocked {
                error: error.map(str::to_string),
            },
            AdminView::Unlocked {
                entries,
                count,
                form,
                submitting,
                generating,
                description_is_fallback,
            } => ServerMessage::AdminView {
                sites: entries.into_iter().map(AdminEntryDto::from).collect(),
                count,
                form: form.into(),
                submitting,
                generating,
                generated_by_fallback: description_is_fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_snake_case_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"edit_form","url":"example.com","title":"Example"}"#)
                .unwrap();
        match msg {
            ClientMessage::EditForm {
                url,
                title,
                description,
            } => {
                assert_eq!(url, "example.com");
                assert_eq!(title, "Example");
                assert!(description.is_empty());
            }
            other => panic!("unexpected message {:?}", other),
        }

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"open_admin"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::OpenAdmin));
    }

    #[test]
    fn locked_view_serializes_with_error() {
        let msg = ServerMessage::from(LockView {
            error: Some("denied"),
            clear_password: true,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "locked", "error": "denied", "clear_password": true})
        );
    }

    #[test]
    fn empty_grid_serializes_empty_flag() {
        let msg = ServerMessage::from(GridView {
            query: "zzz".to_string(),
            cards: Vec::new(),
            empty: true,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "grid", "query": "zzz", "cards": [], "empty": true})
        );
    }
}
