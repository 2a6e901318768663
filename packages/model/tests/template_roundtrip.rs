use chrono::NaiveDate;
use lettercraft_model::{
    default_template, extract_keys, DocumentSettings, FragmentId, SettingsUpdate, Unit, Variable,
};

fn template() -> DocumentSettings {
    default_template(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
}

#[test]
fn test_template_survives_json() {
    let settings = template();
    let json = serde_json::to_string_pretty(&settings).unwrap();
    assert!(json.contains("\"headerLines\""));
    assert!(json.contains("\"defaultValue\": \"17 Oktober 2026\""));

    let back: DocumentSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn test_unit_switching_does_not_drift() {
    let mut settings = template();
    let start = settings.page.clone();
    for _ in 0..5 {
        settings = settings
            .with_all([
                SettingsUpdate::SetUnit { unit: Unit::In },
                SettingsUpdate::SetUnit { unit: Unit::Cm },
                SettingsUpdate::SetUnit { unit: Unit::Mm },
            ])
            .unwrap();
    }
    assert_eq!(settings.page.unit, Unit::Mm);
    assert!((settings.page.width - start.width).abs() <= 0.02);
    assert!((settings.page.height - start.height).abs() <= 0.02);

    let settled = settings
        .with_all([
            SettingsUpdate::SetUnit { unit: Unit::In },
            SettingsUpdate::SetUnit { unit: Unit::Mm },
        ])
        .unwrap();
    assert_eq!(settled.page, settings.page);
}

#[test]
fn test_insertion_then_rename_keeps_fragments_consistent() {
    let settings = template()
        .with_all([
            SettingsUpdate::RegisterVariable {
                variable: Variable::new("perihal", "Perihal", "Undangan"),
            },
            SettingsUpdate::SetFragment {
                id: FragmentId::Body,
                markup: "<p>Perihal: {{ $perihal }}</p>".to_string(),
            },
            SettingsUpdate::RenameVariable {
                from: "perihal".to_string(),
                to: "hal".to_string(),
            },
        ])
        .unwrap();

    assert_eq!(extract_keys(settings.fragment(FragmentId::Body)), vec!["hal"]);
    assert_eq!(settings.variables.get("hal").unwrap().default_value, "Undangan");
}
