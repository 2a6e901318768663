//! # Editable Surfaces
//!
//! A surface is the live, user-editable rendering of one fragment. Hosts
//! (a webview bridge, a native text widget) implement [`EditableSurface`];
//! [`MemorySurface`] is an in-process implementation that behaves like a
//! content-editable region and backs tests and headless sessions.

use crate::selection::Selection;
use crate::EditorError;
use lettercraft_markup::range::{delete_range, insert_text, normalize, text_len};
use lettercraft_markup::{parse, serialize, Fragment};
use lettercraft_model::FragmentId;

pub trait EditableSurface {
    fn fragment_id(&self) -> FragmentId;

    /// Current markup as the surface would report it
    fn markup(&self) -> String;

    fn set_markup(&mut self, markup: &str);

    /// Whether the surface holds focus; `None` when the host cannot tell
    fn has_focus(&self) -> Option<bool>;

    fn focus(&mut self);

    fn blur(&mut self);

    /// Current selection; `None` when the host cannot report one
    fn selection(&self) -> Option<Selection>;

    fn set_selection(&mut self, selection: Selection);
}

/// In-memory content-editable region
#[derive(Debug, Clone)]
pub struct MemorySurface {
    id: FragmentId,
    fragment: Fragment,
    focused: bool,
    reports_focus: bool,
    selection: Option<Selection>,
}

impl MemorySurface {
    pub fn new(id: FragmentId) -> Self {
        Self {
            id,
            fragment: Fragment::default(),
            focused: false,
            reports_focus: true,
            selection: None,
        }
    }

    pub fn with_markup(id: FragmentId, markup: &str) -> Self {
        let mut surface = Self::new(id);
        surface.set_markup(markup);
        surface
    }

    /// Behave like a host that cannot report focus
    pub fn without_focus_reporting(mut self) -> Self {
        self.reports_focus = false;
        self
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn text_len(&self) -> usize {
        self.fragment.text_len()
    }

    pub fn select(&mut self, start: usize, end: usize) {
        self.set_selection(Selection::range(self.id, start, end));
    }

    pub fn select_all(&mut self) {
        let len = self.text_len();
        self.select(0, len);
    }

    /// Type text the way a user would: focus, replace the selection, and
    /// leave the caret after the inserted text.
    pub fn type_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.focus();
        let len = self.text_len();
        let selection = self
            .selection
            .unwrap_or_else(|| Selection::caret(self.id, len))
            .clamped(len);

        let nodes = &mut self.fragment.nodes;
        if !selection.is_collapsed() {
            delete_range(nodes, selection.start, selection.end)?;
        }
        let caret = insert_text(nodes, selection.start, text)?;
        normalize(nodes, false);
        self.selection = Some(Selection::caret(self.id, caret));
        Ok(())
    }
}

impl EditableSurface for MemorySurface {
    fn fragment_id(&self) -> FragmentId {
        self.id
    }

    fn markup(&self) -> String {
        serialize(&self.fragment)
    }

    fn set_markup(&mut self, markup: &str) {
        self.fragment = parse(markup);
        let len = text_len(&self.fragment.nodes);
        self.selection = self.selection.map(|s| s.clamped(len));
    }

    fn has_focus(&self) -> Option<bool> {
        self.reports_focus.then_some(self.focused)
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let len = self.text_len();
        self.selection = Some(selection.clamped(len));
    }
}
