//! Contracts of the text-field host and the view layer.
//!
//! Neither side is implemented here. Host mutations report success as a
//! plain `bool` (the editor may refuse any call); failures are logged by the
//! render path and never abort a batch. The view receives one-way
//! notifications only and must not call back synchronously.

use std::ops::Range;

use crate::candidates::SurfaceCommand;
use crate::gateway::CursorAnchor;
use crate::keyevent::KeyEvent;
use crate::router::ViewIntent;
use crate::spec::CompositionMode;

/// Attributes of a newly focused field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    pub selection_start: i32,
    pub selection_end: i32,
    pub password: bool,
}

/// Styled composing text handed to `set_composing_text`. `highlight` is a
/// codepoint range of the focused segment; the whole span is underlined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposingText {
    pub text: String,
    pub highlight: Option<Range<usize>>,
    pub underline: bool,
}

impl ComposingText {
    pub fn cleared() -> Self {
        ComposingText::default()
    }
}

/// Mutation primitives of the focused editor. One render batch brackets its
/// calls with `begin_batch_edit`/`end_batch_edit` so no intermediate state
/// is observable.
pub trait TextFieldHost {
    fn begin_batch_edit(&mut self) -> bool;
    fn end_batch_edit(&mut self) -> bool;
    fn delete_surrounding_text(&mut self, before: usize, after: usize) -> bool;
    fn commit_text(&mut self, text: &str, anchor: CursorAnchor) -> bool;
    fn set_composing_text(&mut self, text: &ComposingText, anchor: CursorAnchor) -> bool;
    fn set_selection(&mut self, start: i32, end: i32) -> bool;
    /// Re-inject a key event into the application, bypassing the IME.
    fn forward_key_to_application(&mut self, event: &KeyEvent);
}

/// One-way notifications consumed by the view layer.
pub trait ViewProxy {
    /// A view-local action resolved by the router (menu, symbol view, ...).
    fn handle_intent(&mut self, intent: ViewIntent);
    /// A key whose reply directed it at the view layer.
    fn forward_key(&mut self, event: &KeyEvent);
    /// Candidate surface updates from the mode controller.
    fn apply_surface(&mut self, command: &SurfaceCommand);
    /// The resolved composition mode changed; update the status icon.
    fn update_mode_icon(&mut self, mode: CompositionMode);
}
