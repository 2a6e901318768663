//! Selection as an explicit value
//!
//! Offsets count characters of a fragment's text content, so a selection
//! stays meaningful when the surface re-renders its markup.

use lettercraft_model::FragmentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub fragment_id: FragmentId,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(fragment_id: FragmentId, offset: usize) -> Self {
        Self {
            fragment_id,
            start: offset,
            end: offset,
        }
    }

    /// A range between two offsets in either order
    pub fn range(fragment_id: FragmentId, anchor: usize, head: usize) -> Self {
        Self {
            fragment_id,
            start: anchor.min(head),
            end: anchor.max(head),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both ends limited to `len`
    pub fn clamped(&self, len: usize) -> Self {
        Self {
            fragment_id: self.fragment_id,
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_orders_offsets() {
        let selection = Selection::range(FragmentId::Body, 9, 4);
        assert_eq!((selection.start, selection.end), (4, 9));
        assert_eq!(selection.len(), 5);
        assert!(!selection.is_collapsed());
    }

    #[test]
    fn test_clamped() {
        let selection = Selection::range(FragmentId::Body, 2, 40).clamped(10);
        assert_eq!((selection.start, selection.end), (2, 10));
        assert!(Selection::caret(FragmentId::Body, 12).clamped(10).is_collapsed());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&Selection::caret(FragmentId::Footer, 3)).unwrap();
        assert_eq!(json, r#"{"fragmentId":"footer","start":3,"end":3}"#);
    }
}
