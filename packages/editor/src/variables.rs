//! Variable token insertion on surfaces

use crate::controller::SurfaceController;
use crate::executor::edit;
use crate::selection::Selection;
use crate::surface::EditableSurface;
use crate::EditorError;
use lettercraft_markup::range::{delete_range, insert_text, text_len};
use lettercraft_markup::ZERO_WIDTH_SPACE;
use lettercraft_model::{canonical_token, is_valid_key, UpdateError, Variable};
use tracing::debug;

fn check_key(key: &str) -> Result<(), EditorError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(UpdateError::InvalidKey(key.to_string()).into())
    }
}

/// Replace the selection (or insert at the caret) with the key's token.
/// Returns the propagated markup.
pub fn insert_variable_token<S: EditableSurface>(
    controller: &mut SurfaceController<S>,
    key: &str,
) -> Result<Option<String>, EditorError> {
    check_key(key)?;
    let token = canonical_token(key);

    let (result, _, markup) = edit(controller, |nodes, selection| {
        let selection = selection.clamped(text_len(nodes));
        if !selection.is_collapsed() {
            if let Err(err) = delete_range(nodes, selection.start, selection.end) {
                return (Err(err), selection);
            }
        }
        match insert_text(nodes, selection.start, &token) {
            Ok(caret) => (Ok(()), Selection::caret(selection.fragment_id, caret)),
            Err(err) => (Err(err), selection),
        }
    });
    result?;

    debug!(key, "inserted variable token");
    Ok(markup)
}

/// Turn the selected text into a variable: the text is replaced by the
/// token and becomes the variable's default value.
pub fn convert_selection_to_variable<S: EditableSurface>(
    controller: &mut SurfaceController<S>,
    key: &str,
    label: &str,
) -> Result<(Variable, Option<String>), EditorError> {
    check_key(key)?;

    let surface = controller.surface();
    let has_selection = surface
        .selection()
        .filter(|s| s.fragment_id == surface.fragment_id())
        .is_some_and(|s| !s.is_collapsed());
    if !has_selection {
        return Err(EditorError::EmptySelection);
    }

    let token = canonical_token(key);
    let (result, _, markup) = edit(controller, |nodes, selection| {
        let selection = selection.clamped(text_len(nodes));
        if selection.is_collapsed() {
            return (Err(EditorError::EmptySelection), selection);
        }
        let removed = match delete_range(nodes, selection.start, selection.end) {
            Ok(removed) => removed,
            Err(err) => return (Err(err.into()), selection),
        };
        match insert_text(nodes, selection.start, &token) {
            Ok(caret) => (Ok(removed), Selection::caret(selection.fragment_id, caret)),
            Err(err) => (Err(err.into()), selection),
        }
    });

    let removed = result?;
    let value = removed.replace(ZERO_WIDTH_SPACE, "");
    debug!(key, value = value.trim(), "converted selection to variable");
    Ok((Variable::new(key, label, value.trim()), markup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use lettercraft_model::FragmentId;

    fn controller(markup: &str) -> SurfaceController<MemorySurface> {
        SurfaceController::mount(MemorySurface::new(FragmentId::Body), markup)
    }

    #[test]
    fn test_insert_token_at_caret() {
        let mut controller = controller("<p>Dear </p>");
        controller.surface_mut().select(5, 5);
        let markup = insert_variable_token(&mut controller, "nama").unwrap();
        assert_eq!(markup.as_deref(), Some("<p>Dear {{ $nama }}</p>"));
        assert_eq!(
            controller.surface().selection(),
            Some(Selection::caret(FragmentId::Body, 16))
        );
    }

    #[test]
    fn test_insert_token_replaces_selection() {
        let mut controller = controller("Dear Sir");
        controller.surface_mut().select(5, 8);
        let markup = insert_variable_token(&mut controller, "nama").unwrap();
        assert_eq!(markup.as_deref(), Some("Dear {{ $nama }}"));
    }

    #[test]
    fn test_invalid_key_rejected_before_edit() {
        let mut controller = controller("abc");
        let err = insert_variable_token(&mut controller, "bad key").unwrap_err();
        assert!(matches!(err, EditorError::Update(UpdateError::InvalidKey(_))));
        assert_eq!(controller.surface().has_focus(), Some(false));
    }

    #[test]
    fn test_convert_selection() {
        let mut controller = controller("<p>Kepada <b>Budi Santoso</b> di tempat</p>");
        controller.surface_mut().select(7, 19);
        let (variable, markup) =
            convert_selection_to_variable(&mut controller, "penerima", "Penerima").unwrap();

        assert_eq!(variable.key, "penerima");
        assert_eq!(variable.label, "Penerima");
        assert_eq!(variable.default_value, "Budi Santoso");
        assert_eq!(
            markup.as_deref(),
            Some("<p>Kepada {{ $penerima }} di tempat</p>")
        );
    }

    #[test]
    fn test_convert_requires_selection() {
        let mut controller = controller("abc");
        controller.surface_mut().select(1, 1);
        let err = convert_selection_to_variable(&mut controller, "x", "X").unwrap_err();
        assert!(matches!(err, EditorError::EmptySelection));
        assert_eq!(controller.surface().markup(), "abc");
    }
}
