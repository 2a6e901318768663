//! # Lettercraft Markup
//!
//! Tolerant parsing, serialization and character-offset editing of the
//! rich-text fragments stored in letter templates.
//!
//! Fragments come from editable surfaces and may be malformed; [`parse`]
//! repairs instead of rejecting, and [`serialize`] always emits well-formed
//! markup. The [`range`] functions address content by character offset so
//! that selections survive re-rendering.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod range;
pub mod serializer;

pub use ast::{Element, Fragment, Node, ZERO_WIDTH_SPACE};
pub use error::{MarkupError, MarkupResult};
pub use parser::{decode_entities, parse};
pub use range::{Boundary, NodePath};
pub use serializer::{escape_attribute, escape_text, serialize, serialize_nodes};
