//! # Settings Updates
//!
//! The closed set of field-level changes a session can make to a
//! [`DocumentSettings`]. Applying an update validates it against the current
//! value and returns a new value; the input is never modified.
//!
//! ## Semantics
//!
//! - `SetUnit` re-expresses all geometry in the new unit (via millimeters)
//! - `SetPageSize` loads the preset's dimensions in the current unit;
//!   `Custom` keeps the current dimensions
//! - `RegisterVariable` with a taken key is a no-op (first registration wins)
//! - `RenameVariable` rewrites every token referencing the old key in all
//!   four fragments
//! - `RemoveVariable` leaves referencing tokens in place; they pass through
//!   compilation unresolved

use crate::error::UpdateError;
use crate::registry::Variable;
use crate::settings::{DocumentSettings, FragmentId, HeaderLine, Signature, Toggle};
use crate::tokens::rename_tokens;
use crate::units::{PageSize, Unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SettingsUpdate {
    SetTitle {
        title: Option<String>,
    },

    SetUnit {
        unit: Unit,
    },

    SetPageSize {
        size: PageSize,
    },

    /// Explicit dimensions; switches the preset to `Custom`
    SetPageDimensions {
        width: f64,
        height: f64,
    },

    SetMargins {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },

    /// Global family when `section` is `None`; clearing a section's family
    /// falls back to the global one
    SetFontFamily {
        section: Option<FragmentId>,
        family: Option<String>,
    },

    SetFontSize {
        points: f64,
    },

    SetFragment {
        id: FragmentId,
        markup: String,
    },

    SetToggle {
        toggle: Toggle,
        value: bool,
    },

    AddHeaderLine {
        line: HeaderLine,
    },

    UpdateHeaderLine {
        line: HeaderLine,
    },

    RemoveHeaderLine {
        id: String,
    },

    MoveHeaderLine {
        id: String,
        index: usize,
    },

    AddSignature {
        signature: Signature,
    },

    UpdateSignature {
        signature: Signature,
    },

    RemoveSignature {
        id: String,
    },

    MoveSignature {
        id: String,
        index: usize,
    },

    RegisterVariable {
        variable: Variable,
    },

    UpdateVariable {
        key: String,
        label: Option<String>,
        default_value: Option<String>,
    },

    RemoveVariable {
        key: String,
    },

    RenameVariable {
        from: String,
        to: String,
    },

    SetCity {
        city: String,
    },

    SetLogo {
        logo: Option<String>,
    },
}

impl SettingsUpdate {
    /// Apply to a settings value, producing the updated value
    pub fn apply(&self, settings: &DocumentSettings) -> Result<DocumentSettings, UpdateError> {
        self.validate(settings)?;

        let mut next = settings.clone();
        match self {
            SettingsUpdate::SetTitle { title } => next.title = title.clone(),

            SettingsUpdate::SetUnit { unit } => next.page = next.page.converted_to(*unit),

            SettingsUpdate::SetPageSize { size } => {
                next.page.size = *size;
                if let Some((width, height)) = size.dimensions_in(next.page.unit) {
                    next.page.width = width;
                    next.page.height = height;
                }
            }

            SettingsUpdate::SetPageDimensions { width, height } => {
                next.page.size = PageSize::Custom;
                next.page.width = *width;
                next.page.height = *height;
            }

            SettingsUpdate::SetMargins {
                top,
                right,
                bottom,
                left,
            } => {
                next.page.margin_top = *top;
                next.page.margin_right = *right;
                next.page.margin_bottom = *bottom;
                next.page.margin_left = *left;
            }

            SettingsUpdate::SetFontFamily { section, family } => match section {
                Some(section) => *next.typography.section_slot(*section) = family.clone(),
                None => {
                    if let Some(family) = family {
                        next.typography.font_family = family.clone();
                    }
                }
            },

            SettingsUpdate::SetFontSize { points } => next.typography.font_size = *points,

            SettingsUpdate::SetFragment { id, markup } => *next.fragments.slot(*id) = markup.clone(),

            SettingsUpdate::SetToggle { toggle, value } => *next.toggle_slot(*toggle) = *value,

            SettingsUpdate::AddHeaderLine { line } => next.header_lines.push(line.clone()),

            SettingsUpdate::UpdateHeaderLine { line } => {
                if let Some(slot) = next.header_lines.iter_mut().find(|l| l.id == line.id) {
                    *slot = line.clone();
                }
            }

            SettingsUpdate::RemoveHeaderLine { id } => next.header_lines.retain(|l| &l.id != id),

            SettingsUpdate::MoveHeaderLine { id, index } => {
                move_by_id(&mut next.header_lines, |l| &l.id == id, *index)
            }

            SettingsUpdate::AddSignature { signature } => next.signatures.push(signature.clone()),

            SettingsUpdate::UpdateSignature { signature } => {
                if let Some(slot) = next.signatures.iter_mut().find(|s| s.id == signature.id) {
                    *slot = signature.clone();
                }
            }

            SettingsUpdate::RemoveSignature { id } => next.signatures.retain(|s| &s.id != id),

            SettingsUpdate::MoveSignature { id, index } => {
                move_by_id(&mut next.signatures, |s| &s.id == id, *index)
            }

            SettingsUpdate::RegisterVariable { variable } => {
                next.variables.register(variable.clone())?;
            }

            SettingsUpdate::UpdateVariable {
                key,
                label,
                default_value,
            } => next
                .variables
                .update(key, label.as_deref(), default_value.as_deref())?,

            SettingsUpdate::RemoveVariable { key } => {
                next.variables.remove(key);
            }

            SettingsUpdate::RenameVariable { from, to } => {
                next.variables.rename(from, to)?;
                for id in FragmentId::ALL {
                    let slot = next.fragments.slot(id);
                    *slot = rename_tokens(slot, from, to);
                }
                for signature in &mut next.signatures {
                    signature.name = rename_tokens(&signature.name, from, to);
                    signature.title = rename_tokens(&signature.title, from, to);
                    if let Some(label) = &mut signature.label {
                        *label = rename_tokens(label, from, to);
                    }
                }
                next.city = rename_tokens(&next.city, from, to);
            }

            SettingsUpdate::SetCity { city } => next.city = city.clone(),

            SettingsUpdate::SetLogo { logo } => next.logo = logo.clone(),
        }

        Ok(next)
    }

    /// Check the update against the current value without applying it
    pub fn validate(&self, settings: &DocumentSettings) -> Result<(), UpdateError> {
        match self {
            SettingsUpdate::SetPageDimensions { width, height } => {
                positive("width", *width)?;
                positive("height", *height)?;
            }

            SettingsUpdate::SetMargins {
                top,
                right,
                bottom,
                left,
            } => {
                for value in [*top, *right, *bottom, *left] {
                    non_negative("margin", value)?;
                }
            }

            SettingsUpdate::SetFontSize { points } => positive("font size", *points)?,

            SettingsUpdate::AddHeaderLine { line } => {
                if settings.header_lines.iter().any(|l| l.id == line.id) {
                    return Err(UpdateError::DuplicateId(line.id.clone()));
                }
                validate_line(line)?;
            }

            SettingsUpdate::UpdateHeaderLine { line } => {
                header_line_exists(settings, &line.id)?;
                validate_line(line)?;
            }

            SettingsUpdate::RemoveHeaderLine { id } | SettingsUpdate::MoveHeaderLine { id, .. } => {
                header_line_exists(settings, id)?;
            }

            SettingsUpdate::AddSignature { signature } => {
                if settings.signatures.iter().any(|s| s.id == signature.id) {
                    return Err(UpdateError::DuplicateId(signature.id.clone()));
                }
            }

            SettingsUpdate::UpdateSignature { signature } => signature_exists(settings, &signature.id)?,

            SettingsUpdate::RemoveSignature { id } | SettingsUpdate::MoveSignature { id, .. } => {
                signature_exists(settings, id)?;
            }

            SettingsUpdate::UpdateVariable { key, .. } | SettingsUpdate::RemoveVariable { key } => {
                if !settings.variables.contains(key) {
                    return Err(UpdateError::VariableNotFound(key.clone()));
                }
            }

            // Registry operations validate themselves
            _ => {}
        }
        Ok(())
    }
}

impl DocumentSettings {
    /// Apply a single update, returning the new settings
    pub fn with(&self, update: SettingsUpdate) -> Result<DocumentSettings, UpdateError> {
        update.apply(self)
    }

    /// Apply updates in order; stops at the first failure
    pub fn with_all(
        &self,
        updates: impl IntoIterator<Item = SettingsUpdate>,
    ) -> Result<DocumentSettings, UpdateError> {
        let mut current = self.clone();
        for update in updates {
            current = update.apply(&current)?;
        }
        Ok(current)
    }
}

fn move_by_id<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool, index: usize) {
    if let Some(from) = items.iter().position(matches) {
        let item = items.remove(from);
        let index = index.min(items.len());
        items.insert(index, item);
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), UpdateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(UpdateError::InvalidValue { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), UpdateError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(UpdateError::InvalidValue { field, value })
    }
}

fn validate_line(line: &HeaderLine) -> Result<(), UpdateError> {
    positive("line width", line.width)?;
    non_negative("line margin", line.margin_top)?;
    non_negative("line margin", line.margin_bottom)
}

fn header_line_exists(settings: &DocumentSettings, id: &str) -> Result<(), UpdateError> {
    if settings.header_lines.iter().any(|l| l.id == id) {
        Ok(())
    } else {
        Err(UpdateError::HeaderLineNotFound(id.to_string()))
    }
}

fn signature_exists(settings: &DocumentSettings, id: &str) -> Result<(), UpdateError> {
    if settings.signatures.iter().any(|s| s.id == id) {
        Ok(())
    } else {
        Err(UpdateError::SignatureNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LineStyle;

    #[test]
    fn test_apply_returns_new_value() {
        let original = DocumentSettings::default();
        let updated = original
            .with(SettingsUpdate::SetCity {
                city: "Bandung".to_string(),
            })
            .unwrap();

        assert_eq!(original.city, "");
        assert_eq!(updated.city, "Bandung");
    }

    #[test]
    fn test_set_unit_converts_geometry() {
        let settings = DocumentSettings::default()
            .with(SettingsUpdate::SetUnit { unit: Unit::In })
            .unwrap();
        assert_eq!(settings.page.unit, Unit::In);
        assert_eq!(settings.page.width, 8.268);
        assert_eq!(settings.page.margin_left, 0.984);
    }

    #[test]
    fn test_set_page_size_uses_current_unit() {
        let settings = DocumentSettings::default()
            .with_all([
                SettingsUpdate::SetUnit { unit: Unit::Cm },
                SettingsUpdate::SetPageSize { size: PageSize::F4 },
            ])
            .unwrap();
        assert_eq!((settings.page.width, settings.page.height), (21.5, 33.0));
    }

    #[test]
    fn test_set_dimensions_switches_to_custom() {
        let settings = DocumentSettings::default()
            .with(SettingsUpdate::SetPageDimensions {
                width: 200.0,
                height: 250.0,
            })
            .unwrap();
        assert_eq!(settings.page.size, PageSize::Custom);

        let err = settings
            .with(SettingsUpdate::SetPageDimensions {
                width: 0.0,
                height: 250.0,
            })
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidValue { field: "width", .. }));
    }

    #[test]
    fn test_header_line_lifecycle() {
        let settings = DocumentSettings::default()
            .with_all([
                SettingsUpdate::AddHeaderLine {
                    line: HeaderLine::new("a", 3.0, LineStyle::Solid),
                },
                SettingsUpdate::AddHeaderLine {
                    line: HeaderLine::new("b", 1.0, LineStyle::Double),
                },
                SettingsUpdate::MoveHeaderLine {
                    id: "b".to_string(),
                    index: 0,
                },
            ])
            .unwrap();
        let ids: Vec<_> = settings.header_lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let err = settings
            .with(SettingsUpdate::AddHeaderLine {
                line: HeaderLine::new("a", 1.0, LineStyle::Solid),
            })
            .unwrap_err();
        assert_eq!(err, UpdateError::DuplicateId("a".to_string()));

        let err = settings
            .with(SettingsUpdate::RemoveHeaderLine { id: "zz".to_string() })
            .unwrap_err();
        assert_eq!(err, UpdateError::HeaderLineNotFound("zz".to_string()));
    }

    #[test]
    fn test_rename_variable_rewrites_tokens() {
        let settings = DocumentSettings::default()
            .with_all([
                SettingsUpdate::RegisterVariable {
                    variable: Variable::new("nama", "Nama", "Jane"),
                },
                SettingsUpdate::SetFragment {
                    id: FragmentId::Body,
                    markup: "Dear {{$nama}}".to_string(),
                },
                SettingsUpdate::SetFragment {
                    id: FragmentId::Footer,
                    markup: "cc: {{ $nama }}".to_string(),
                },
                SettingsUpdate::RenameVariable {
                    from: "nama".to_string(),
                    to: "penerima".to_string(),
                },
            ])
            .unwrap();

        assert_eq!(settings.fragment(FragmentId::Body), "Dear {{ $penerima }}");
        assert_eq!(settings.fragment(FragmentId::Footer), "cc: {{ $penerima }}");
        assert!(settings.variables.contains("penerima"));
        assert!(!settings.variables.contains("nama"));
    }

    #[test]
    fn test_rename_variable_rewrites_signatures_and_city() {
        let mut signature = Signature::new("s1", "{{ $pejabat }}", "Kepala {{$unit}}");
        signature.label = Some("a.n. {{ $pejabat }}".to_string());
        let settings = DocumentSettings::default()
            .with_all([
                SettingsUpdate::RegisterVariable {
                    variable: Variable::new("pejabat", "Pejabat", ""),
                },
                SettingsUpdate::AddSignature { signature },
                SettingsUpdate::SetCity {
                    city: "Kota {{ $pejabat }}".to_string(),
                },
                SettingsUpdate::RenameVariable {
                    from: "pejabat".to_string(),
                    to: "penandatangan".to_string(),
                },
            ])
            .unwrap();

        let signature = settings.signatures.last().unwrap();
        assert_eq!(signature.name, "{{ $penandatangan }}");
        assert_eq!(signature.title, "Kepala {{$unit}}");
        assert_eq!(signature.label.as_deref(), Some("a.n. {{ $penandatangan }}"));
        assert_eq!(settings.city, "Kota {{ $penandatangan }}");
    }

    #[test]
    fn test_remove_variable_leaves_tokens() {
        let settings = DocumentSettings::default()
            .with_all([
                SettingsUpdate::RegisterVariable {
                    variable: Variable::new("nama", "Nama", ""),
                },
                SettingsUpdate::SetFragment {
                    id: FragmentId::Body,
                    markup: "{{ $nama }}".to_string(),
                },
                SettingsUpdate::RemoveVariable {
                    key: "nama".to_string(),
                },
            ])
            .unwrap();
        assert!(settings.variables.is_empty());
        assert_eq!(settings.fragment(FragmentId::Body), "{{ $nama }}");
    }

    #[test]
    fn test_failed_update_is_atomic() {
        let settings = DocumentSettings::default();
        let result = settings.with_all([
            SettingsUpdate::SetCity {
                city: "Bogor".to_string(),
            },
            SettingsUpdate::UpdateSignature {
                signature: Signature::new("missing", "", ""),
            },
        ]);
        assert_eq!(
            result.unwrap_err(),
            UpdateError::SignatureNotFound("missing".to_string())
        );
        assert_eq!(settings.city, "");
    }

    #[test]
    fn test_update_serializes_tagged() {
        let json = serde_json::to_string(&SettingsUpdate::SetToggle {
            toggle: Toggle::RepeatHeader,
            value: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"setToggle","toggle":"repeatHeader","value":true}"#);
    }
}
