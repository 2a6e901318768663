//! # Document Settings
//!
//! The aggregate root of a letter template. A settings value is never
//! mutated in place by the editing session; each change goes through
//! [`SettingsUpdate`](crate::update::SettingsUpdate) and produces a new value.

use crate::registry::VariableRegistry;
use crate::units::{convert, PageSize, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four editable regions of a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentId {
    Header,
    Body,
    Footer,
    Attachment,
}

impl FragmentId {
    pub const ALL: [FragmentId; 4] = [
        FragmentId::Header,
        FragmentId::Body,
        FragmentId::Footer,
        FragmentId::Attachment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FragmentId::Header => "header",
            FragmentId::Body => "body",
            FragmentId::Footer => "footer",
            FragmentId::Attachment => "attachment",
        }
    }

    /// Class name of the block this fragment compiles into
    pub fn class_name(self) -> &'static str {
        match self {
            FragmentId::Header => "letter-header",
            FragmentId::Body => "letter-content",
            FragmentId::Footer => "letter-footer",
            FragmentId::Attachment => "letter-attachment",
        }
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub size: PageSize,
    pub unit: Unit,
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            unit: Unit::Mm,
            width: 210.0,
            height: 297.0,
            margin_top: 20.0,
            margin_right: 20.0,
            margin_bottom: 20.0,
            margin_left: 25.0,
        }
    }
}

impl PageGeometry {
    /// Every length re-expressed in `unit`
    pub fn converted_to(&self, unit: Unit) -> Self {
        let from = self.unit;
        Self {
            size: self.size,
            unit,
            width: convert(self.width, from, unit),
            height: convert(self.height, from, unit),
            margin_top: convert(self.margin_top, from, unit),
            margin_right: convert(self.margin_right, from, unit),
            margin_bottom: convert(self.margin_bottom, from, unit),
            margin_left: convert(self.margin_left, from, unit),
        }
    }

    pub fn margins(&self) -> [f64; 4] {
        [
            self.margin_top,
            self.margin_right,
            self.margin_bottom,
            self.margin_left,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    /// Base size in points
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_font_family: Option<String>,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size: 12.0,
            header_font_family: None,
            body_font_family: None,
            footer_font_family: None,
        }
    }
}

impl Typography {
    /// Section override, falling back to the global family
    pub fn family_for(&self, section: FragmentId) -> &str {
        let specific = match section {
            FragmentId::Header => &self.header_font_family,
            FragmentId::Body | FragmentId::Attachment => &self.body_font_family,
            FragmentId::Footer => &self.footer_font_family,
        };
        specific.as_deref().unwrap_or(&self.font_family)
    }

    pub(crate) fn section_slot(&mut self, section: FragmentId) -> &mut Option<String> {
        match section {
            FragmentId::Header => &mut self.header_font_family,
            FragmentId::Body | FragmentId::Attachment => &mut self.body_font_family,
            FragmentId::Footer => &mut self.footer_font_family,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Double,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Double => "double",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
        }
    }
}

/// A ruled divider stacked beneath the header block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLine {
    pub id: String,
    /// Thickness in px
    pub width: f64,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default = "default_line_color")]
    pub color: String,
    #[serde(default)]
    pub margin_top: f64,
    #[serde(default)]
    pub margin_bottom: f64,
}

fn default_line_color() -> String {
    "#000000".to_string()
}

impl HeaderLine {
    pub fn new(id: impl Into<String>, width: f64, style: LineStyle) -> Self {
        Self {
            id: id.into(),
            width,
            style,
            color: default_line_color(),
            margin_top: 0.0,
            margin_bottom: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    #[default]
    Wet,
    Qr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: SignatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl Signature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            kind: SignatureType::Wet,
            label: None,
            align: None,
        }
    }

    pub fn with_kind(mut self, kind: SignatureType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }
}

/// Markup of the four editable regions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fragments {
    pub header: String,
    pub body: String,
    pub footer: String,
    pub attachment: String,
}

impl Fragments {
    pub fn get(&self, id: FragmentId) -> &str {
        match id {
            FragmentId::Header => &self.header,
            FragmentId::Body => &self.body,
            FragmentId::Footer => &self.footer,
            FragmentId::Attachment => &self.attachment,
        }
    }

    pub(crate) fn slot(&mut self, id: FragmentId) -> &mut String {
        match id {
            FragmentId::Header => &mut self.header,
            FragmentId::Body => &mut self.body,
            FragmentId::Footer => &mut self.footer,
            FragmentId::Attachment => &mut self.attachment,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FragmentId, &str)> {
        FragmentId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

/// Which optional blocks a letter shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Toggle {
    Header,
    Footer,
    Signature,
    Attachment,
    RepeatHeader,
}

impl Toggle {
    /// Settings field the toggle is stored in, e.g. `showHeader`
    pub fn flag(self) -> &'static str {
        match self {
            Toggle::Header => "showHeader",
            Toggle::Footer => "showFooter",
            Toggle::Signature => "showSignature",
            Toggle::Attachment => "showAttachment",
            Toggle::RepeatHeader => "repeatHeader",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub page: PageGeometry,
    pub typography: Typography,
    pub fragments: Fragments,
    pub header_lines: Vec<HeaderLine>,
    pub signatures: Vec<Signature>,
    pub variables: VariableRegistry,
    pub show_header: bool,
    pub show_footer: bool,
    pub show_signature: bool,
    pub show_attachment: bool,
    pub repeat_header: bool,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            title: None,
            page: PageGeometry::default(),
            typography: Typography::default(),
            fragments: Fragments::default(),
            header_lines: Vec::new(),
            signatures: Vec::new(),
            variables: VariableRegistry::new(),
            show_header: true,
            show_footer: false,
            show_signature: true,
            show_attachment: false,
            repeat_header: false,
            city: String::new(),
            logo: None,
        }
    }
}

impl DocumentSettings {
    pub fn fragment(&self, id: FragmentId) -> &str {
        self.fragments.get(id)
    }

    pub fn toggle(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Header => self.show_header,
            Toggle::Footer => self.show_footer,
            Toggle::Signature => self.show_signature,
            Toggle::Attachment => self.show_attachment,
            Toggle::RepeatHeader => self.repeat_header,
        }
    }

    pub(crate) fn toggle_slot(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::Header => &mut self.show_header,
            Toggle::Footer => &mut self.show_footer,
            Toggle::Signature => &mut self.show_signature,
            Toggle::Attachment => &mut self.show_attachment,
            Toggle::RepeatHeader => &mut self.repeat_header,
        }
    }

    /// Fragments that contribute to compiled output under the current toggles
    pub fn visible_fragments(&self) -> Vec<FragmentId> {
        let mut visible = Vec::new();
        if self.show_header {
            visible.push(FragmentId::Header);
        }
        visible.push(FragmentId::Body);
        if self.show_footer {
            visible.push(FragmentId::Footer);
        }
        if self.show_attachment {
            visible.push(FragmentId::Attachment);
        }
        visible
    }
}
