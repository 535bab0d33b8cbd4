//! Document session and the editor state machine.
//!
//! ```text
//! Empty ──open──▶ Loading ──ok──▶ Rendered ◀──▶ Saving
//!   ▲                │                ▲            │
//!   └──decode error──┘                └──failure───┘
//! ```
//!
//! A load is split into [`Editor::begin_load`] and [`Editor::finish_load`]
//! so work started for a superseded file can be recognised by its
//! [`SessionId`] and dropped instead of overwriting the newer session.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collect::{collect_edits, require_edits, EditDiff};
use crate::config::EditorConfig;
use crate::engine::RenderEngine;
use crate::error::{DecodeError, EditorError, Result};
use crate::overlay::{DocumentLayout, ElementId};
use crate::render::render_document;
use crate::submit::{EditedPdf, Rewriter};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// The original file as selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl SourceFile {
    /// A file is accepted only when its content type is `application/pdf`.
    pub fn new(name: impl Into<String>, content_type: &str, bytes: impl Into<Bytes>) -> Result<Self> {
        let name = name.into();
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if !essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            return Err(EditorError::InvalidFileType { name });
        }
        Ok(Self {
            name,
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes: bytes.into(),
        })
    }

    /// Content type implied by a file name's extension.
    #[must_use]
    pub fn content_type_for(path: &Path) -> &'static str {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_CONTENT_TYPE,
            _ => "application/octet-stream",
        }
    }

    /// Read a file from disk. Non-PDF names are rejected before any I/O.
    pub async fn open(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = Self::content_type_for(path);
        if content_type != PDF_CONTENT_TYPE {
            return Err(EditorError::InvalidFileType { name });
        }
        let bytes = tokio::fs::read(path).await?;
        Self::new(name, content_type, bytes)
    }
}

/// Identity token for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One loaded document: the original file plus its layout.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub file: SourceFile,
    pub layout: DocumentLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Rendered,
    Saving,
}

/// What the status indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Hidden,
    Loading,
    RenderingPage { page: u32, total: u32 },
    ApplyingChanges,
}

impl Status {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => Ok(()),
            Self::Loading => write!(f, "Loading PDF..."),
            Self::RenderingPage { page, total } => write!(f, "Rendering page {page} of {total}..."),
            Self::ApplyingChanges => write!(f, "Applying changes..."),
        }
    }
}

/// Handed out by [`Editor::begin_load`]; redeemed by [`Editor::finish_load`].
#[derive(Debug, Clone)]
pub struct LoadTicket {
    id: SessionId,
    file: SourceFile,
}

impl LoadTicket {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn file(&self) -> &SourceFile {
        &self.file
    }
}

/// Owns the active session and drives the load/edit/save lifecycle.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    state: SessionState,
    status: Status,
    pending: Option<SessionId>,
    session: Option<Session>,
}

impl Editor {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: SessionState::Empty,
            status: Status::Hidden,
            pending: None,
            session: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether the save action is enabled.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.state == SessionState::Rendered && self.session.is_some()
    }

    /// Start loading `file`, discarding the current session.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self, file: SourceFile) -> Result<LoadTicket> {
        if self.state == SessionState::Saving {
            return Err(EditorError::Busy);
        }
        let id = SessionId::new();
        if let Some(previous) = self.pending.replace(id) {
            debug!(%previous, "superseding in-flight load");
        }
        self.session = None;
        self.state = SessionState::Loading;
        self.status = Status::Loading;
        info!(session = %id, file = %file.name, bytes = file.bytes.len(), "loading document");
        Ok(LoadTicket { id, file })
    }

    /// Whether `ticket` still belongs to the load in progress.
    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.pending == Some(ticket.id)
    }

    /// Progress from a load. Ignored for stale tickets.
    pub fn report_page(&mut self, ticket: &LoadTicket, page: u32, total: u32) {
        if self.is_current(ticket) {
            self.status = Status::RenderingPage { page, total };
        }
    }

    /// Install the result of a load.
    ///
    /// Stale tickets are rejected with [`EditorError::Superseded`] and leave
    /// the editor untouched. A decode failure resets the editor to `Empty`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<DocumentLayout, DecodeError>,
    ) -> Result<&Session> {
        if !self.is_current(&ticket) {
            warn!(session = %ticket.id, "dropping result of superseded load");
            return Err(EditorError::Superseded);
        }
        self.pending = None;
        self.status = Status::Hidden;

        match result {
            Ok(layout) => {
                self.state = SessionState::Rendered;
                info!(
                    session = %ticket.id,
                    pages = layout.pages().len(),
                    elements = layout.records().len(),
                    "document ready"
                );
                Ok(&*self.session.insert(Session {
                    id: ticket.id,
                    file: ticket.file,
                    layout,
                }))
            }
            Err(e) => {
                self.state = SessionState::Empty;
                self.session = None;
                Err(e.into())
            }
        }
    }

    /// Load and render `file` with `engine` in one step.
    pub async fn open(&mut self, engine: &dyn RenderEngine, file: SourceFile) -> Result<&Session> {
        let ticket = self.begin_load(file)?;
        let scale = self.config.scale;
        let bytes = ticket.file.bytes.clone();

        let result = render_document(engine, &bytes, scale, |page, total| {
            self.report_page(&ticket, page, total);
        })
        .await;

        self.finish_load(ticket, result)
    }

    /// Replace the live text of one element.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        if self.state != SessionState::Rendered {
            return Err(EditorError::Busy);
        }
        let session = self.session.as_mut().ok_or(EditorError::NoDocument)?;
        if session.layout.set_text(id, text) {
            Ok(())
        } else {
            Err(EditorError::UnknownElement(id.0))
        }
    }

    /// Diffs that a save would submit right now.
    #[must_use]
    pub fn pending_edits(&self) -> Vec<EditDiff> {
        self.session
            .as_ref()
            .map(|s| collect_edits(s.layout.records(), &s.layout))
            .unwrap_or_default()
    }

    /// Submit pending edits.
    ///
    /// With no changes this returns [`EditorError::NoChanges`] without
    /// calling `rewriter`. Whatever the outcome, the editor ends up back in
    /// `Rendered` with the status hidden.
    pub async fn save(&mut self, rewriter: &dyn Rewriter) -> Result<EditedPdf> {
        match self.state {
            SessionState::Rendered => {}
            SessionState::Empty => return Err(EditorError::NoDocument),
            SessionState::Loading | SessionState::Saving => return Err(EditorError::Busy),
        }
        let Some(session) = self.session.as_ref() else {
            return Err(EditorError::NoDocument);
        };

        let edits = require_edits(session.layout.records(), &session.layout)?;
        let file = session.file.clone();

        self.state = SessionState::Saving;
        self.status = Status::ApplyingChanges;
        info!(edits = edits.len(), file = %file.name, "applying changes");

        let result = rewriter.rewrite(&file, &edits).await;

        self.state = SessionState::Rendered;
        self.status = Status::Hidden;
        if let Err(e) = &result {
            warn!(error = %e, "save failed");
        }
        result
    }
}
