//! # Surface Controller
//!
//! Keeps a fragment's authoritative markup and its live surface consistent
//! without moving the user's caret mid-edit.
//!
//! Each direction has an explicit precondition:
//!
//! - **authority → surface** ([`SurfaceController::reconcile`]): applied only
//!   while the surface is unfocused. While focused the overwrite is
//!   suppressed, except that clearing a non-empty surface always wins.
//!   Hosts that cannot report focus get a plain overwrite.
//! - **surface → authority** ([`SurfaceController::on_input`]): the live
//!   markup is propagated only when it differs from the last known value.
//!
//! A suppressed overwrite leaves the controller in
//! [`SyncState::LiveDiverged`] until the next propagation or blur.

use crate::surface::EditableSurface;
use lettercraft_markup::range::normalize;
use lettercraft_markup::{parse, serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Surface reflects the authoritative markup (or the user's edits to it)
    Authoritative,
    /// An external update was withheld because the surface had focus
    LiveDiverged,
}

/// What [`SurfaceController::reconcile`] did with an external update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    Applied,
    Cleared,
    Suppressed,
    Unchanged,
}

pub struct SurfaceController<S: EditableSurface> {
    surface: S,
    authoritative: String,
    state: SyncState,
}

impl<S: EditableSurface> SurfaceController<S> {
    /// Attach to a surface and render the initial markup into it
    pub fn mount(mut surface: S, markup: &str) -> Self {
        surface.set_markup(markup);
        Self {
            surface,
            authoritative: markup.to_string(),
            state: SyncState::Authoritative,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn authoritative(&self) -> &str {
        &self.authoritative
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Bring an externally changed authoritative value to the surface
    pub fn reconcile(&mut self, markup: &str) -> Reconcile {
        let live = self.surface.markup();
        self.authoritative = markup.to_string();

        if live == markup {
            self.state = SyncState::Authoritative;
            return Reconcile::Unchanged;
        }

        match self.surface.has_focus() {
            Some(true) => {
                if markup.trim().is_empty() && !live.trim().is_empty() {
                    self.surface.set_markup(markup);
                    self.state = SyncState::Authoritative;
                    Reconcile::Cleared
                } else {
                    debug!(
                        fragment = %self.surface.fragment_id(),
                        "surface focused, deferring external update"
                    );
                    self.state = SyncState::LiveDiverged;
                    Reconcile::Suppressed
                }
            }
            Some(false) | None => {
                self.surface.set_markup(markup);
                self.state = SyncState::Authoritative;
                Reconcile::Applied
            }
        }
    }

    /// Handle a raw input event. Returns the new authoritative markup when
    /// the surface content changed.
    pub fn on_input(&mut self) -> Option<String> {
        let live = self.surface.markup();
        self.state = SyncState::Authoritative;
        if live == self.authoritative {
            return None;
        }
        self.authoritative = live.clone();
        Some(live)
    }

    /// Handle focus leaving the surface.
    ///
    /// Editor artifacts (caret anchors, emptied wrappers) are stripped. An
    /// update deferred while focused is applied now; otherwise the cleaned
    /// markup is propagated if it changed.
    pub fn on_blur(&mut self) -> Option<String> {
        self.surface.blur();

        if self.state == SyncState::LiveDiverged {
            let markup = self.authoritative.clone();
            self.surface.set_markup(&markup);
            self.state = SyncState::Authoritative;
            return None;
        }

        let live = self.surface.markup();
        let cleaned = strip_artifacts(&live);
        if cleaned != live {
            self.surface.set_markup(&cleaned);
        }
        self.on_input()
    }
}

/// Markup with caret anchors and emptied inline wrappers removed
pub fn strip_artifacts(markup: &str) -> String {
    let mut fragment = parse(markup);
    normalize(&mut fragment.nodes, true);
    serialize(&fragment)
}
