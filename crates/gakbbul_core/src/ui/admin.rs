//! crates/gakbbul_core/src/ui/admin.rs
//!
//! The admin panel: a second password gate in front of the site list, the
//! delete action and the add form.
//!
//! The panel never talks to the store itself. Each mutating action is split in
//! a `begin_*` step, which validates the request, raises the in-flight flag and
//! hands out a [`PanelTicket`], and a `finish_*` step that applies the result.
//! The form and the in-flight flags outlive the panel, so results always land
//! on them. Tickets are bound to one open/close lifetime of the panel: a result
//! from an earlier lifetime raises no alert.

use uuid::Uuid;

use crate::description::DescriptionOutcome;
use crate::domain::{Site, SiteFormData};
use crate::ports::PortResult;

pub const ADMIN_PASSWORD_ERROR: &str = "비밀번호가 올바르지 않습니다.";
pub const MISSING_FIELDS_ALERT: &str = "URL과 제목을 먼저 입력해주세요.";
pub const ADD_FAILED_ALERT: &str = "사이트 추가 실패";
pub const DELETE_FAILED_ALERT: &str = "사이트 삭제 실패";
pub const DELETE_CONFIRM_PROMPT: &str = "정말 삭제하시겠습니까?";

/// When the admin gate closes again once it has been unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminLockPolicy {
    /// Stays unlocked across close/reopen for the rest of the page session.
    #[default]
    KeepForSession,
    /// Locks again every time the panel is closed.
    RelockOnClose,
}

/// Identifies the panel lifetime an in-flight operation was issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTicket(u64);

/// Why the panel refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdminRejection {
    #[error("the admin panel is closed")]
    Closed,
    #[error("the admin panel is locked")]
    Locked,
    #[error("an identical operation is already in flight")]
    Busy,
    #[error("url and title are required")]
    MissingFields,
    #[error("no delete is awaiting confirmation")]
    NothingToConfirm,
}

/// What applying an operation's result did to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Issued from a previous panel lifetime; the form was updated but nothing is reported.
    Discarded,
    /// The operation failed and the user must be alerted.
    Alert(&'static str),
}

/// One line of the admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEntry {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminView {
    Closed,
    Locked {
        error: Option<&'static str>,
    },
    Unlocked {
        entries: Vec<AdminEntry>,
        count: usize,
        form: SiteFormData,
        submitting: bool,
        generating: bool,
        description_is_fallback: bool,
    },
}

#[derive(Debug)]
pub struct AdminPanel {
    policy: AdminLockPolicy,
    open: bool,
    unlocked: bool,
    password_error: Option<&'static str>,
    form: SiteFormData,
    submitting: bool,
    generating: bool,
    description_is_fallback: bool,
    pending_delete: Option<Uuid>,
    epoch: u64,
}

impl AdminPanel {
    pub fn new(policy: AdminLockPolicy) -> Self {
        Self {
            policy,
            open: false,
            unlocked: false,
            password_error: None,
            form: SiteFormData::default(),
            submitting: false,
            generating: false,
            description_is_fallback: false,
            pending_delete: None,
            epoch: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn form(&self) -> &SiteFormData {
        &self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    pub fn open(&mut self) {
        if !self.open {
            self.open = true;
            self.epoch += 1;
        }
    }

    /// Closes the panel. Operations still in flight keep their busy flag until they finish.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.epoch += 1;
        self.password_error = None;
        self.pending_delete = None;
        if self.policy == AdminLockPolicy::RelockOnClose {
            self.unlocked = false;
        }
    }

    /// Compares `password` with the admin secret by exact equality.
    pub fn authenticate(&mut self, password: &str, secret: &str) -> Result<bool, AdminRejection> {
        if !self.open {
            return Err(AdminRejection::Closed);
        }
        if password == secret {
            self.unlocked = true;
            self.password_error = None;
        } else {
            self.password_error = Some(ADMIN_PASSWORD_ERROR);
        }
        Ok(self.unlocked)
    }

    pub fn edit_form(&mut self, form: SiteFormData) -> Result<(), AdminRejection> {
        self.ensure_usable()?;
        if form.description != self.form.description {
            self.description_is_fallback = false;
        }
        self.form = form;
        Ok(())
    }

    /// Starts an AI-assisted description fill. Returns the title and url to describe.
    pub fn begin_generate(&mut self) -> Result<(PanelTicket, String, String), AdminRejection> {
        self.ensure_usable()?;
        if self.generating {
            return Err(AdminRejection::Busy);
        }
        if !self.form.has_required_fields() {
            return Err(AdminRejection::MissingFields);
        }
        self.generating = true;
        Ok((
            self.ticket(),
            self.form.title.clone(),
            self.form.url.clone(),
        ))
    }

    pub fn finish_generate(&mut self, ticket: PanelTicket, outcome: DescriptionOutcome) -> Completion {
        self.generating = false;
        self.description_is_fallback = outcome.is_fallback();
        self.form.description = outcome.into_text();
        if self.is_current(ticket) {
            Completion::Applied
        } else {
            Completion::Discarded
        }
    }

    /// Starts adding the site in the form. Returns the form to persist.
    pub fn begin_submit(&mut self) -> Result<(PanelTicket, SiteFormData), AdminRejection> {
        self.ensure_usable()?;
        if self.submitting {
            return Err(AdminRejection::Busy);
        }
        if !self.form.has_required_fields() {
            return Err(AdminRejection::MissingFields);
        }
        self.submitting = true;
        Ok((self.ticket(), self.form.clone()))
    }

    /// Clears the form on success; keeps it and asks for an alert on failure.
    pub fn finish_submit(&mut self, ticket: PanelTicket, result: &PortResult<Site>) -> Completion {
        self.submitting = false;
        if result.is_ok() {
            self.form = SiteFormData::default();
            self.description_is_fallback = false;
        }
        match result {
            _ if !self.is_current(ticket) => Completion::Discarded,
            Ok(_) => Completion::Applied,
            Err(_) => Completion::Alert(ADD_FAILED_ALERT),
        }
    }

    /// Marks `id` for deletion; the user still has to confirm.
    pub fn request_delete(&mut self, id: Uuid) -> Result<(), AdminRejection> {
        self.ensure_usable()?;
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Result<(PanelTicket, Uuid), AdminRejection> {
        self.ensure_usable()?;
        let id = self
            .pending_delete
            .take()
            .ok_or(AdminRejection::NothingToConfirm)?;
        Ok((self.ticket(), id))
    }

    /// The list is never touched here; it changes when the subscription pushes.
    pub fn finish_delete(&mut self, ticket: PanelTicket, result: &PortResult<()>) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Discarded;
        }
        match result {
            Ok(()) => Completion::Applied,
            Err(_) => Completion::Alert(DELETE_FAILED_ALERT),
        }
    }

    pub fn view(&self, sites: &[Site]) -> AdminView {
        if !self.open {
            return AdminView::Closed;
        }
        if !self.unlocked {
            return AdminView::Locked {
                error: self.password_error,
            };
        }
        let entries: Vec<AdminEntry> = sites
            .iter()
            .map(|site| AdminEntry {
                id: site.id,
                title: site.title.clone(),
                url: site.url.clone(),
            })
            .collect();
        AdminView::Unlocked {
            count: entries.len(),
            entries,
            form: self.form.clone(),
            submitting: self.submitting,
            generating: self.generating,
            description_is_fallback: self.description_is_fallback,
        }
    }

    fn ensure_usable(&self) -> Result<(), AdminRejection> {
        if !self.open {
            Err(AdminRejection::Closed)
        } else if !self.unlocked {
            Err(AdminRejection::Locked)
        } else {
            Ok(())
        }
    }

    fn ticket(&self) -> PanelTicket {
        PanelTicket(self.epoch)
    }

    fn is_current(&self, ticket: PanelTicket) -> bool {
        self.open && ticket.0 == self.epoch
    }
}
