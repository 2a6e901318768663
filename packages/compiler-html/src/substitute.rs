//! Variable substitution
//!
//! Preview replaces each token whose key is registered with a stand-in span
//! showing the variable's default value. Export leaves markup untouched so a
//! downstream templating system can resolve the tokens. Tokens with no
//! registered key pass through in both modes.

use lettercraft_markup::{escape_attribute, escape_text};
use lettercraft_model::{token_regex, Variable, VariableRegistry};
use regex::Captures;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Preview,
    Export,
}

pub fn substitute(markup: &str, variables: &VariableRegistry, mode: Mode) -> String {
    match mode {
        Mode::Export => markup.to_string(),
        Mode::Preview => token_regex()
            .replace_all(markup, |caps: &Captures| match variables.get(&caps[1]) {
                Some(variable) => stand_in(variable),
                None => caps[0].to_string(),
            })
            .into_owned(),
    }
}

/// Inline stand-in for a variable in preview.
///
/// Braces in the displayed value are escaped so a stand-in never contains
/// token syntax.
pub fn stand_in(variable: &Variable) -> String {
    let value = escape_text(variable.display_value())
        .replace('{', "&#123;")
        .replace('}', "&#125;");
    format!(
        r#"<span class="variable-preview" data-variable="{}">{}</span>"#,
        escape_attribute(&variable.key),
        value
    )
}
