//! Integration tests for editor crate

use chrono::NaiveDate;
use lettercraft_editor::{
    EditSession, EditableSurface, EditorError, FormatCommand, Selection, Strategy, SyncState,
};
use lettercraft_model::{default_template, FragmentId, SettingsUpdate, Variable};

fn session() -> EditSession {
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    EditSession::new("test-client", default_template(today))
}

#[test]
fn test_template_preview_and_export() {
    let session = session();
    let compiled = session.compile().unwrap();

    assert!(compiled
        .preview
        .contains(r#"<span class="variable-preview" data-variable="nomor">001/ABC/2026</span>"#));
    assert!(compiled
        .preview
        .contains(r#"<span class="variable-preview" data-variable="tanggal">17 Oktober 2026</span>"#));
    assert!(compiled.export.contains("Nomor: {{ $nomor }}"));
    assert!(compiled.export.contains("Jakarta, {{ $tanggal }}"));
    assert_eq!(session.preview().unwrap(), compiled.preview);
    assert_eq!(session.export().unwrap(), compiled.export);
}

#[test]
fn test_typing_propagates_to_settings() {
    let mut session = session();
    let body = session.controller_mut(FragmentId::Body);
    let len = body.surface().text_len();
    body.surface_mut().select(len, len);
    body.surface_mut().type_text(" Terima kasih.").unwrap();

    assert!(session.on_input(FragmentId::Body).unwrap());
    assert!(session
        .settings()
        .fragment(FragmentId::Body)
        .ends_with("<p>Isi surat. Terima kasih.</p>"));
    assert!(!session.on_input(FragmentId::Body).unwrap());
}

#[test]
fn test_external_update_never_moves_focused_caret() {
    let mut session = session();
    {
        let body = session.controller_mut(FragmentId::Body);
        body.surface_mut().focus();
        body.surface_mut().select(3, 3);
    }

    session
        .update(SettingsUpdate::SetFragment {
            id: FragmentId::Body,
            markup: "<p>replaced elsewhere</p>".to_string(),
        })
        .unwrap();

    let body = session.controller(FragmentId::Body);
    assert_eq!(body.state(), SyncState::LiveDiverged);
    assert!(body.surface().markup().contains("Nomor:"));
    assert_eq!(body.surface().selection(), Some(Selection::caret(FragmentId::Body, 3)));

    // Nothing typed since, so the deferred value lands on blur
    assert!(!session.on_blur(FragmentId::Body).unwrap());
    assert_eq!(
        session.surface(FragmentId::Body).markup(),
        "<p>replaced elsewhere</p>"
    );
}

#[test]
fn test_clearing_focused_fragment_wins() {
    let mut session = session();
    session
        .controller_mut(FragmentId::Body)
        .surface_mut()
        .focus();

    session
        .update(SettingsUpdate::SetFragment {
            id: FragmentId::Body,
            markup: String::new(),
        })
        .unwrap();
    assert_eq!(session.surface(FragmentId::Body).markup(), "");
}

#[test]
fn test_bold_command_updates_settings() {
    let mut session = session();
    session.select(Selection::range(FragmentId::Body, 0, 5));
    let outcome = session.execute(FragmentId::Body, &FormatCommand::Bold).unwrap();

    assert_eq!(outcome.strategy, Strategy::Wrapped);
    assert!(session
        .settings()
        .fragment(FragmentId::Body)
        .starts_with("<p><b>Nomor</b>: {{ $nomor }}</p>"));
    assert_eq!(
        session.surface(FragmentId::Body).has_focus(),
        Some(true)
    );
}

#[test]
fn test_insert_variable_registers_new_key() {
    let mut session = session();
    session.select(Selection::caret(FragmentId::Footer, 0));

    let registered = session
        .insert_variable(FragmentId::Footer, Variable::new("perihal", "Perihal", "Undangan"))
        .unwrap();
    assert!(registered);
    assert_eq!(session.settings().fragment(FragmentId::Footer), "{{ $perihal }}");
    assert_eq!(
        session.settings().variables.get("perihal").unwrap().default_value,
        "Undangan"
    );

    let again = session
        .insert_variable(FragmentId::Footer, Variable::new("perihal", "Other", "Other"))
        .unwrap();
    assert!(!again);
    assert_eq!(
        session.settings().variables.get("perihal").unwrap().label,
        "Perihal"
    );
}

#[test]
fn test_convert_selection_to_variable() {
    let mut session = session();
    // "Isi surat." in the last paragraph of the body
    let body_text = session.surface(FragmentId::Body).fragment().text_content();
    let start = body_text.chars().count() - "Isi surat.".len();
    session.select(Selection::range(FragmentId::Body, start + 4, start + 9));

    let variable = session
        .convert_selection_to_variable(FragmentId::Body, "isi", "Isi")
        .unwrap();
    assert_eq!(variable.default_value, "surat");
    assert!(session
        .settings()
        .fragment(FragmentId::Body)
        .ends_with("<p>Isi {{ $isi }}.</p>"));

    let preview = session.preview().unwrap();
    assert!(preview.contains(r#"<span class="variable-preview" data-variable="isi">surat</span>."#));
}

#[test]
fn test_convert_without_selection_fails() {
    let mut session = session();
    let before = session.settings().clone();
    let err = session
        .convert_selection_to_variable(FragmentId::Body, "isi", "Isi")
        .unwrap_err();
    assert!(matches!(err, EditorError::EmptySelection));
    assert_eq!(session.settings(), &before);
}

#[test]
fn test_rename_variable_rewrites_surfaces() {
    let mut session = session();
    session
        .update(SettingsUpdate::RenameVariable {
            from: "nama".to_string(),
            to: "penerima".to_string(),
        })
        .unwrap();

    let markup = session.surface(FragmentId::Body).markup();
    assert!(markup.contains("{{ $penerima }}"));
    assert!(!markup.contains("{{ $nama }}"));
}

#[test]
fn test_reset_restores_template() {
    let mut session = session();
    let original = session.settings().clone();
    session
        .update(SettingsUpdate::SetCity {
            city: "Bandung".to_string(),
        })
        .unwrap();
    session.reset(original.clone());
    assert_eq!(session.settings(), &original);
    assert_eq!(session.version(), 2);
}
