//! # Lettercraft HTML Compiler
//!
//! Turns [`DocumentSettings`](lettercraft_model::DocumentSettings) into a
//! standalone HTML letter. Compilation is a pure function of the settings:
//! the same value always yields the same markup.
//!
//! Two outputs are produced. Preview resolves registered variables to
//! visible stand-ins; export keeps `{{ $key }}` tokens for a downstream
//! templating system.
//!
//! Blocks switched by a settings flag are only emitted when the flag is on,
//! and are bracketed by `<!-- @if($showHeader) -->` / `<!-- @endif -->`
//! comments naming the flag, so the downstream template can still gate
//! them. The comments appear in both outputs to keep their structure equal.

mod compiler;
pub mod layout;
pub mod substitute;

pub use compiler::{compile, compile_with, render, CompileError, CompileOptions, CompiledDocument};
pub use substitute::{stand_in, substitute, Mode};
