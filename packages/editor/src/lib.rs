//! # Lettercraft Editor
//!
//! Interactive editing of letter templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ surfaces: live rich-text regions (host UI)  │
//! └─────────────────────────────────────────────┘
//!           ↑ reconcile        ↓ input / blur
//! ┌─────────────────────────────────────────────┐
//! │ editor: session + surface controllers       │
//! │  - Formatting commands with fallbacks       │
//! │  - Variable tokens and conversion           │
//! │  - Analysis and logo services               │
//! └─────────────────────────────────────────────┘
//!                     ↓ SettingsUpdate
//! ┌─────────────────────────────────────────────┐
//! │ model: DocumentSettings → compiler-html     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Settings are the source of truth**: surfaces are views of fragments
//! 2. **Never move the caret**: focused surfaces are not overwritten
//! 3. **Formatting never fails outward**: every command has a fallback
//! 4. **One analysis at a time**: results apply only to their own request
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lettercraft_editor::{EditSession, FormatCommand, Selection};
//! use lettercraft_model::{default_template_today, FragmentId};
//!
//! let mut session = EditSession::new("client-1", default_template_today());
//! session.select(Selection::range(FragmentId::Body, 0, 5));
//! session.execute(FragmentId::Body, &FormatCommand::Bold)?;
//! let html = session.preview()?;
//! ```

pub mod commands;
pub mod controller;
pub mod errors;
pub mod executor;
pub mod selection;
pub mod services;
pub mod session;
pub mod surface;
pub mod variables;

pub use commands::{Alignment, FormatCommand, ListKind, TableSpec};
pub use controller::{strip_artifacts, Reconcile, SurfaceController, SyncState};
pub use errors::{EditorError, ServiceError};
pub use executor::{execute, font_size_step, CommandOutcome, Strategy};
pub use selection::Selection;
pub use services::{
    data_uri, AnalysisService, AspectRatio, GeneratedImage, LogoService, Upload, UploadKind,
};
pub use session::{AnalysisTicket, EditSession};
pub use surface::{EditableSurface, MemorySurface};
pub use variables::{convert_selection_to_variable, insert_variable_token};
