//! # Lettercraft Model
//!
//! Document settings for letter templates: page geometry, typography, the
//! four rich-text fragments, header lines, signatures and the variable
//! registry, plus the closed set of updates that produce new settings.

pub mod analysis;
pub mod defaults;
pub mod error;
pub mod registry;
pub mod settings;
pub mod tokens;
pub mod units;
pub mod update;

pub use analysis::{AnalysisRecord, DetectedVariable};
pub use defaults::{default_template, default_template_today, format_letter_date, DATE_KEY};
pub use error::UpdateError;
pub use registry::{Variable, VariableRegistry};
pub use settings::{
    Align, DocumentSettings, FragmentId, Fragments, HeaderLine, LineStyle, PageGeometry, Signature,
    SignatureType, Toggle, Typography,
};
pub use tokens::{canonical_token, extract_keys, is_valid_key, rename_tokens, token_regex};
pub use units::{convert, PageSize, Unit};
pub use update::SettingsUpdate;
