//! # Edit Session
//!
//! One user's editing of one letter template.
//!
//! The session owns the authoritative [`DocumentSettings`] and one
//! [`SurfaceController`] per fragment. Every change to the settings goes
//! through a [`SettingsUpdate`], producing a new settings value; changed
//! fragments are then reconciled with their surfaces. Edits that originate
//! on a surface flow the other way and are stored with
//! `SettingsUpdate::SetFragment`.
//!
//! At most one document analysis may be outstanding. Its result is applied
//! only for the ticket that started it.

use crate::commands::FormatCommand;
use crate::controller::{Reconcile, SurfaceController};
use crate::errors::{EditorError, ServiceError};
use crate::executor::{execute, CommandOutcome};
use crate::selection::Selection;
use crate::services::{AnalysisService, AspectRatio, LogoService, Upload};
use crate::surface::{EditableSurface, MemorySurface};
use crate::variables;
use lettercraft_compiler_html::{compile_with, render, CompileOptions, CompiledDocument, Mode};
use lettercraft_model::{AnalysisRecord, DocumentSettings, FragmentId, SettingsUpdate, Variable};
use tracing::{debug, info, warn};

/// Identifies one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket(u64);

impl AnalysisTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub struct EditSession<S: EditableSurface = MemorySurface> {
    /// Unique session identifier
    pub id: String,

    /// Authoritative settings
    settings: DocumentSettings,

    /// One controller per fragment, in `FragmentId::ALL` order
    controllers: Vec<SurfaceController<S>>,

    /// Outstanding analysis request
    pending_analysis: Option<AnalysisTicket>,

    next_ticket: u64,

    /// Bumped on every settings change
    version: u64,

    options: CompileOptions,
}

fn slot(id: FragmentId) -> usize {
    match id {
        FragmentId::Header => 0,
        FragmentId::Body => 1,
        FragmentId::Footer => 2,
        FragmentId::Attachment => 3,
    }
}

impl EditSession<MemorySurface> {
    /// Session backed by in-memory surfaces
    pub fn new(id: impl Into<String>, settings: DocumentSettings) -> Self {
        Self::with_surfaces(id, settings, MemorySurface::new)
    }
}

impl<S: EditableSurface> EditSession<S> {
    /// Session over host-provided surfaces, one per fragment
    pub fn with_surfaces(
        id: impl Into<String>,
        settings: DocumentSettings,
        mut make_surface: impl FnMut(FragmentId) -> S,
    ) -> Self {
        let controllers = FragmentId::ALL
            .into_iter()
            .map(|fragment| SurfaceController::mount(make_surface(fragment), settings.fragment(fragment)))
            .collect();

        Self {
            id: id.into(),
            settings,
            controllers,
            pending_analysis: None,
            next_ticket: 1,
            version: 0,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn controller(&self, id: FragmentId) -> &SurfaceController<S> {
        &self.controllers[slot(id)]
    }

    pub fn controller_mut(&mut self, id: FragmentId) -> &mut SurfaceController<S> {
        &mut self.controllers[slot(id)]
    }

    pub fn surface(&self, id: FragmentId) -> &S {
        self.controller(id).surface()
    }

    /// Apply an update and reconcile fragments whose markup changed
    pub fn update(&mut self, update: SettingsUpdate) -> Result<(), EditorError> {
        let next = self.settings.with(update)?;
        self.replace_settings(next);
        Ok(())
    }

    /// Replace the settings wholesale (template load or reset)
    pub fn reset(&mut self, settings: DocumentSettings) {
        info!(session = %self.id, "resetting settings");
        self.replace_settings(settings);
    }

    fn replace_settings(&mut self, next: DocumentSettings) {
        for id in FragmentId::ALL {
            if next.fragment(id) == self.settings.fragment(id) {
                continue;
            }
            let outcome = self.controllers[slot(id)].reconcile(next.fragment(id));
            if outcome == Reconcile::Suppressed {
                debug!(session = %self.id, fragment = %id, "update deferred until blur");
            }
        }
        self.settings = next;
        self.version += 1;
    }

    /// Store markup that came from a surface without echoing it back
    fn store_fragment(&mut self, id: FragmentId, markup: String) -> Result<(), EditorError> {
        self.settings = self.settings.with(SettingsUpdate::SetFragment { id, markup })?;
        self.version += 1;
        Ok(())
    }

    fn store_propagated(&mut self, id: FragmentId, markup: Option<String>) -> Result<bool, EditorError> {
        match markup {
            Some(markup) => {
                self.store_fragment(id, markup)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn select(&mut self, selection: Selection) {
        self.controller_mut(selection.fragment_id)
            .surface_mut()
            .set_selection(selection);
    }

    /// Run a formatting command on a fragment's surface
    pub fn execute(&mut self, id: FragmentId, command: &FormatCommand) -> Result<CommandOutcome, EditorError> {
        let outcome = execute(self.controller_mut(id), command);
        self.store_propagated(id, outcome.markup.clone())?;
        Ok(outcome)
    }

    /// Input event on a surface. Returns whether the settings changed.
    pub fn on_input(&mut self, id: FragmentId) -> Result<bool, EditorError> {
        let markup = self.controller_mut(id).on_input();
        self.store_propagated(id, markup)
    }

    /// Blur event on a surface. Returns whether the settings changed.
    pub fn on_blur(&mut self, id: FragmentId) -> Result<bool, EditorError> {
        let markup = self.controller_mut(id).on_blur();
        self.store_propagated(id, markup)
    }

    /// Insert a variable's token at the fragment's selection, registering
    /// the variable if its key is new. Returns whether it was registered.
    pub fn insert_variable(&mut self, id: FragmentId, variable: Variable) -> Result<bool, EditorError> {
        let markup = variables::insert_variable_token(self.controller_mut(id), &variable.key)?;
        self.store_propagated(id, markup)?;
        self.register(variable)
    }

    /// Replace the selected text with a new variable's token. The selected
    /// text becomes the default value.
    pub fn convert_selection_to_variable(
        &mut self,
        id: FragmentId,
        key: &str,
        label: &str,
    ) -> Result<Variable, EditorError> {
        let (variable, markup) =
            variables::convert_selection_to_variable(self.controller_mut(id), key, label)?;
        self.store_propagated(id, markup)?;
        self.register(variable.clone())?;
        Ok(self.settings.variables.get(key).cloned().unwrap_or(variable))
    }

    fn register(&mut self, variable: Variable) -> Result<bool, EditorError> {
        if self.settings.variables.contains(&variable.key) {
            return Ok(false);
        }
        debug!(session = %self.id, key = %variable.key, "registering variable");
        self.update(SettingsUpdate::RegisterVariable { variable })?;
        Ok(true)
    }

    pub fn compile(&self) -> Result<CompiledDocument, EditorError> {
        Ok(compile_with(&self.settings, self.options.clone())?)
    }

    pub fn preview(&self) -> Result<String, EditorError> {
        Ok(render(&self.settings, Mode::Preview, self.options.clone())?)
    }

    pub fn export(&self) -> Result<String, EditorError> {
        Ok(render(&self.settings, Mode::Export, self.options.clone())?)
    }

    pub fn analysis_pending(&self) -> bool {
        self.pending_analysis.is_some()
    }

    /// Start an analysis of an uploaded letter. Only images and PDFs are
    /// accepted, and only one request may be outstanding.
    pub fn begin_analysis(&mut self, upload: &Upload) -> Result<AnalysisTicket, EditorError> {
        upload.kind()?;
        if self.pending_analysis.is_some() {
            return Err(EditorError::AnalysisPending);
        }
        let ticket = AnalysisTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_analysis = Some(ticket);
        info!(session = %self.id, ticket = ticket.id(), file = %upload.name, "analysis started");
        Ok(ticket)
    }

    /// Finish an analysis. A failed request leaves the settings untouched.
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        result: Result<AnalysisRecord, ServiceError>,
    ) -> Result<(), EditorError> {
        if self.pending_analysis != Some(ticket) {
            return Err(EditorError::StaleTicket(ticket.id()));
        }
        self.pending_analysis = None;

        let record = result.inspect_err(|err| {
            warn!(session = %self.id, ticket = ticket.id(), error = %err, "analysis failed");
        })?;
        let next = record.seed(&self.settings).inspect_err(|err| {
            warn!(session = %self.id, ticket = ticket.id(), error = %err, "analysis result rejected");
        })?;

        self.replace_settings(next);
        info!(
            session = %self.id,
            ticket = ticket.id(),
            variables = self.settings.variables.len(),
            "analysis applied"
        );
        Ok(())
    }

    /// Analyze an uploaded letter and seed the settings from the result
    pub async fn analyze<A: AnalysisService>(&mut self, service: &A, upload: &Upload) -> Result<(), EditorError> {
        let ticket = self.begin_analysis(upload)?;
        let result = service.analyze(upload).await;
        self.complete_analysis(ticket, result)
    }

    /// Generate a logo and place it in the header. Unsupported ratios fall
    /// back to square; the ratio used is returned.
    pub async fn generate_logo<L: LogoService>(
        &mut self,
        service: &L,
        prompt: &str,
        ratio: &str,
    ) -> Result<AspectRatio, EditorError> {
        let ratio = AspectRatio::coerce(ratio);
        let image = service.generate(prompt, ratio).await.inspect_err(|err| {
            warn!(session = %self.id, error = %err, "logo generation failed");
        })?;
        if image.bytes.is_empty() {
            return Err(ServiceError::EmptyResponse.into());
        }

        self.update(SettingsUpdate::SetLogo {
            logo: Some(image.data_uri()),
        })?;
        Ok(ratio)
    }

    /// Insert an uploaded image into the attachment at its selection
    pub fn insert_attachment_image(&mut self, upload: &Upload) -> Result<CommandOutcome, EditorError> {
        upload.require_image()?;
        let command = FormatCommand::InsertImage {
            src: upload.data_uri(),
            alt: Some(upload.name.clone()),
        };
        self.execute(FragmentId::Attachment, &command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettercraft_model::Unit;

    #[test]
    fn test_session_creation_mounts_fragments() {
        let mut settings = DocumentSettings::default();
        settings.fragments.body = "<p>Hi</p>".to_string();
        let session = EditSession::new("client-1", settings);

        assert_eq!(session.id, "client-1");
        assert_eq!(session.version(), 0);
        assert_eq!(session.surface(FragmentId::Body).markup(), "<p>Hi</p>");
        assert_eq!(session.surface(FragmentId::Header).markup(), "");
        assert!(!session.analysis_pending());
    }

    #[test]
    fn test_update_reconciles_changed_fragment() {
        let mut session = EditSession::new("s", DocumentSettings::default());
        session
            .update(SettingsUpdate::SetFragment {
                id: FragmentId::Footer,
                markup: "Halaman 1".to_string(),
            })
            .unwrap();
        assert_eq!(session.surface(FragmentId::Footer).markup(), "Halaman 1");
        assert_eq!(session.version(), 1);

        session.update(SettingsUpdate::SetUnit { unit: Unit::In }).unwrap();
        assert_eq!(session.settings().page.unit, Unit::In);
    }

    #[test]
    fn test_failed_update_keeps_settings() {
        let mut session = EditSession::new("s", DocumentSettings::default());
        let before = session.settings().clone();
        let result = session.update(SettingsUpdate::RemoveVariable {
            key: "missing".to_string(),
        });
        assert!(result.is_err());
        assert_eq!(session.settings(), &before);
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn test_second_analysis_rejected_while_pending() {
        let mut session = EditSession::new("s", DocumentSettings::default());
        let upload = Upload::new("scan.png", "image/png", vec![1]);
        let ticket = session.begin_analysis(&upload).unwrap();
        assert!(matches!(
            session.begin_analysis(&upload),
            Err(EditorError::AnalysisPending)
        ));

        session
            .complete_analysis(ticket, Err(ServiceError::Failed("offline".to_string())))
            .unwrap_err();
        assert!(!session.analysis_pending());
        assert!(matches!(
            session.complete_analysis(ticket, Ok(AnalysisRecord::default())),
            Err(EditorError::StaleTicket(1))
        ));
    }
}
