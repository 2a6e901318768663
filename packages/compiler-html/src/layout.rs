//! # Layout Rules
//!
//! Placement decisions that do not depend on markup: where each signature
//! sits, how header lines are styled and which blocks appear on each page.
//!
//! ## Signatures
//!
//! - one entry: single column, aligned per its `align` (right by default)
//! - even count: two-column grid filled row by row
//! - odd count: the first N-1 fill the grid; the last spans both columns
//!   centered beneath
//!
//! The positionally last entry carries the city and date line.

use lettercraft_model::{Align, DocumentSettings, HeaderLine, Signature};

/// Where one signature entry goes (rows and columns are 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePlacement {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub full_width: bool,
    pub date_line: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureLayout {
    None,
    Single {
        align: Align,
        placement: SignaturePlacement,
    },
    Grid {
        rows: usize,
        placements: Vec<SignaturePlacement>,
    },
}

impl SignatureLayout {
    pub fn placements(&self) -> Vec<SignaturePlacement> {
        match self {
            SignatureLayout::None => Vec::new(),
            SignatureLayout::Single { placement, .. } => vec![*placement],
            SignatureLayout::Grid { placements, .. } => placements.clone(),
        }
    }
}

pub fn signature_layout(signatures: &[Signature]) -> SignatureLayout {
    let count = signatures.len();
    match count {
        0 => SignatureLayout::None,
        1 => SignatureLayout::Single {
            align: signatures[0].align.unwrap_or(Align::Right),
            placement: SignaturePlacement {
                index: 0,
                row: 1,
                column: 1,
                full_width: false,
                date_line: true,
            },
        },
        _ => {
            let placements: Vec<SignaturePlacement> = (0..count)
                .map(|index| {
                    let last = index == count - 1;
                    let full_width = last && count % 2 == 1;
                    SignaturePlacement {
                        index,
                        row: index / 2 + 1,
                        column: if full_width { 1 } else { index % 2 + 1 },
                        full_width,
                        date_line: last,
                    }
                })
                .collect();
            SignatureLayout::Grid {
                rows: count.div_ceil(2),
                placements,
            }
        }
    }
}

/// Inline style of one header divider
pub fn header_line_style(line: &HeaderLine) -> String {
    format!(
        "border-top: {}px {} {}; margin-top: {}px; margin-bottom: {}px;",
        line.width,
        line.style.as_str(),
        line.color,
        line.margin_top,
        line.margin_bottom
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Letter,
    Attachment,
}

/// Blocks that appear on one output page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub kind: PageKind,
    pub header: bool,
    pub footer: bool,
    pub signatures: bool,
}

/// The letter page, followed by the attachment page when enabled
pub fn paginate(settings: &DocumentSettings) -> Vec<PagePlan> {
    let mut pages = vec![PagePlan {
        kind: PageKind::Letter,
        header: settings.show_header,
        footer: settings.show_footer,
        signatures: settings.show_signature && !settings.signatures.is_empty(),
    }];

    if settings.show_attachment {
        pages.push(PagePlan {
            kind: PageKind::Attachment,
            header: settings.show_header && settings.repeat_header,
            footer: settings.show_footer,
            signatures: false,
        });
    }
    pages
}
