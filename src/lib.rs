//! `pdfedit` - in-place PDF text editing
//!
//! Maps the text runs of a rendered PDF onto editable, absolutely
//! positioned elements, then turns the user's edits back into a
//! position-addressed diff that an external rewriting service applies to
//! the original file.
//!
//! # Pipeline
//!
//! ```text
//! RenderEngine → render_document → DocumentLayout (elements + records)
//!     → user edits element text → collect_edits → RewriteClient → EditedPdf
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pdfedit::{Editor, EditorConfig, ElementId, MemoryEngine, RewriteClient, SourceFile};
//!
//! # async fn example(engine: MemoryEngine, bytes: Vec<u8>) -> anyhow::Result<()> {
//! let config = EditorConfig::load()?;
//! let client = RewriteClient::new(&config)?;
//! let mut editor = Editor::new(config);
//!
//! editor.open(&engine, SourceFile::new("report.pdf", "application/pdf", bytes)?).await?;
//! editor.set_text(ElementId(0), "Hello, World")?;
//!
//! let edited = editor.save(&client).await?;
//! edited.save_into(std::path::Path::new(".")).await?;
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod render;
pub mod session;
pub mod submit;

pub use collect::{collect_edits, require_edits, EditDiff, LiveText};
pub use config::EditorConfig;
#[cfg(feature = "pdf")]
pub use engine::PdfiumEngine;
pub use engine::{DocumentHandle, MemoryEngine, MemoryPage, Page, RasterImage, RenderEngine, TextItem, Viewport};
pub use error::{DecodeError, EditorError, PageRenderError, ServiceError};
pub use geometry::{compose, Matrix, Rect};
pub use overlay::{place_item, DocumentLayout, EditableElement, ElementId, ElementStyle, PageView, TextItemRecord};
pub use render::{render_document, render_page, RenderedPage};
pub use session::{Editor, LoadTicket, Session, SessionId, SessionState, SourceFile, Status};
pub use submit::{download_name, EditedPdf, RewriteClient, Rewriter};

/// Version of pdfedit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
