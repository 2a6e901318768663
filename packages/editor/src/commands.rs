//! Formatting commands

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

/// Table dimensions, at least one row and one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub rows: usize,
    pub cols: usize,
}

impl TableSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }
}

impl Default for TableSpec {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

/// One formatting operation on the current selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Strike,
    Align { alignment: Alignment },
    List { kind: ListKind },
    /// Size in points
    FontSize { points: f64 },
    FontFamily { family: String },
    /// CSS color, e.g. `#1f2937`
    Color { color: String },
    InsertTable { table: TableSpec },
    InsertRule,
    InsertImage { src: String, alt: Option<String> },
    /// Literal markup inserted at the caret
    InsertRaw { markup: String },
}

impl FormatCommand {
    pub fn name(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::Strike => "strike",
            FormatCommand::Align { .. } => "align",
            FormatCommand::List { .. } => "list",
            FormatCommand::FontSize { .. } => "fontSize",
            FormatCommand::FontFamily { .. } => "fontFamily",
            FormatCommand::Color { .. } => "color",
            FormatCommand::InsertTable { .. } => "insertTable",
            FormatCommand::InsertRule => "insertRule",
            FormatCommand::InsertImage { .. } => "insertImage",
            FormatCommand::InsertRaw { .. } => "insertRaw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_spec_minimum() {
        assert_eq!(TableSpec::new(0, 0), TableSpec { rows: 1, cols: 1 });
        assert_eq!(TableSpec::default(), TableSpec { rows: 3, cols: 3 });
    }

    #[test]
    fn test_command_json() {
        let command: FormatCommand =
            serde_json::from_str(r#"{"command":"fontSize","points":14}"#).unwrap();
        assert_eq!(command, FormatCommand::FontSize { points: 14.0 });

        let command: FormatCommand = serde_json::from_str(r#"{"command":"bold"}"#).unwrap();
        assert_eq!(command.name(), "bold");
    }
}
