//! Seeding settings from a document analysis result
//!
//! The analysis service reads an existing letter and reports its structure.
//! The record is trusted beyond basic presence checks.

use crate::error::UpdateError;
use crate::registry::Variable;
use crate::settings::{DocumentSettings, FragmentId, Signature};
use crate::tokens::{extract_keys, is_valid_key};
use lettercraft_markup::escape_text;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(default)]
    pub institution_name: String,
    #[serde(default)]
    pub institution_address: String,
    #[serde(default)]
    pub body_markup: String,
    #[serde(default)]
    pub attachment_markup: Option<String>,
    #[serde(default)]
    pub detected_variables: Vec<DetectedVariable>,
    #[serde(default)]
    pub signature_name: Option<String>,
    #[serde(default)]
    pub signature_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedVariable {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl AnalysisRecord {
    /// Presence checks on the fields seeding depends on
    pub fn check(&self) -> Result<(), UpdateError> {
        if self.institution_name.trim().is_empty() {
            return Err(UpdateError::AnalysisIncomplete("institutionName"));
        }
        if self.body_markup.trim().is_empty() {
            return Err(UpdateError::AnalysisIncomplete("bodyMarkup"));
        }
        Ok(())
    }

    /// Build new settings from this record on top of `base`.
    ///
    /// Geometry, typography, header lines and city carry over from `base`;
    /// content, variables and signatures come from the record.
    pub fn seed(&self, base: &DocumentSettings) -> Result<DocumentSettings, UpdateError> {
        self.check()?;

        let mut settings = base.clone();
        settings.fragments.header = self.header_markup();
        settings.fragments.body = self.body_markup.clone();
        match &self.attachment_markup {
            Some(markup) if !markup.trim().is_empty() => {
                settings.fragments.attachment = markup.clone();
                settings.show_attachment = true;
            }
            _ => {
                settings.fragments.attachment.clear();
                settings.show_attachment = false;
            }
        }
        settings.show_header = true;

        if let Some(name) = self.signature_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let title = self.signature_title.clone().unwrap_or_default();
            settings.signatures = vec![Signature::new("sig-1", name, title)];
        }

        // Detected variables first, then any other token the content uses
        let mut variables: Vec<Variable> = base.variables.iter().cloned().collect();
        for detected in &self.detected_variables {
            if !is_valid_key(&detected.key) {
                warn!(key = %detected.key, "skipping detected variable with invalid key");
                continue;
            }
            variables.push(Variable::new(
                detected.key.clone(),
                detected.label.clone().unwrap_or_else(|| detected.key.clone()),
                detected.default_value.clone().unwrap_or_default(),
            ));
        }
        for id in FragmentId::ALL {
            for key in extract_keys(settings.fragment(id)) {
                variables.push(Variable::new(key.clone(), key, ""));
            }
        }
        settings.variables = variables.into_iter().collect();

        debug!(
            variables = settings.variables.len(),
            attachment = settings.show_attachment,
            "seeded settings from analysis"
        );
        Ok(settings)
    }

    fn header_markup(&self) -> String {
        let name = escape_text(self.institution_name.trim());
        let address = escape_text(self.institution_address.trim());
        if address.is_empty() {
            format!(r#"<p style="text-align: center;"><b>{}</b></p>"#, name)
        } else {
            format!(
                r#"<p style="text-align: center;"><b>{}</b><br>{}</p>"#,
                name, address
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnalysisRecord {
        serde_json::from_str(
            r#"{
                "institutionName": "Dinas Pendidikan",
                "institutionAddress": "Jl. Merdeka 1 & 2",
                "bodyMarkup": "<p>Kepada {{ $nama }}, tanggal {{ $tgl }}</p>",
                "detectedVariables": [
                    { "key": "nama", "label": "Nama", "defaultValue": "Jane" },
                    { "key": "bad key" }
                ],
                "signatureName": "Budi",
                "signatureTitle": "Kepala Dinas"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_seed_builds_header_and_signature() {
        let settings = record().seed(&DocumentSettings::default()).unwrap();
        assert_eq!(
            settings.fragment(FragmentId::Header),
            r#"<p style="text-align: center;"><b>Dinas Pendidikan</b><br>Jl. Merdeka 1 &amp; 2</p>"#
        );
        assert_eq!(settings.signatures.len(), 1);
        assert_eq!(settings.signatures[0].title, "Kepala Dinas");
        assert!(!settings.show_attachment);
    }

    #[test]
    fn test_seed_registers_detected_and_referenced_keys() {
        let settings = record().seed(&DocumentSettings::default()).unwrap();
        let keys: Vec<_> = settings.variables.keys().collect();
        assert_eq!(keys, vec!["nama", "tgl"]);
        assert_eq!(settings.variables.get("nama").unwrap().default_value, "Jane");
    }

    #[test]
    fn test_seed_keeps_existing_variables_first() {
        let base = DocumentSettings::default()
            .with(crate::update::SettingsUpdate::RegisterVariable {
                variable: Variable::new("nama", "Penerima", "Existing"),
            })
            .unwrap();
        let settings = record().seed(&base).unwrap();
        assert_eq!(settings.variables.get("nama").unwrap().default_value, "Existing");
    }

    #[test]
    fn test_presence_checks() {
        let mut incomplete = record();
        incomplete.body_markup = "  ".to_string();
        assert_eq!(
            incomplete.check().unwrap_err(),
            UpdateError::AnalysisIncomplete("bodyMarkup")
        );

        let empty = AnalysisRecord::default();
        assert_eq!(
            empty.seed(&DocumentSettings::default()).unwrap_err(),
            UpdateError::AnalysisIncomplete("institutionName")
        );
    }
}
