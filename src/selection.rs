//! Selection tracking: deciding what a host selection notification means.
//!
//! The host only offers best-effort, racy notifications; the tracker
//! classifies each one as the echo of our own render, a caret move inside
//! the composition, or an external change requiring a context reset. It is
//! a pure state machine: it never touches the host or the gateway itself.

use tracing::debug;

/// One host selection notification, positions in codepoints.
/// `candidates_*` is the composing-text span the host reports (-1 when none).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub old_start: i32,
    pub old_end: i32,
    pub new_start: i32,
    pub new_end: i32,
    pub candidates_start: i32,
    pub candidates_end: i32,
}

/// What the session should do about a selection notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    DoNothing,
    ResetContext,
    /// Realign the engine cursor to this codepoint offset from preedit head.
    MoveCursor(usize),
}

#[derive(Debug)]
pub struct SelectionTracker {
    snapshot: SelectionSnapshot,
    /// Absolute offset of the preedit head, or `None` when not composing.
    preedit_start: Option<i32>,
    /// Codepoint length of the tracked preedit.
    preedit_len: i32,
    /// Selection our most recent render will cause the host to report.
    expected: Option<(i32, i32)>,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        SelectionTracker::new()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        SelectionTracker {
            snapshot: SelectionSnapshot::default(),
            preedit_start: None,
            preedit_len: 0,
            expected: None,
        }
    }

    /// Forget everything. Called on field attach/detach and context reset.
    pub fn reset(&mut self) {
        *self = SelectionTracker::new();
    }

    /// Seed the caret from field attributes at attach time.
    pub fn seed(&mut self, start: i32, end: i32) {
        self.reset();
        self.snapshot.new_start = start;
        self.snapshot.new_end = end;
    }

    /// Current caret position (selection start as last reported or expected).
    pub fn caret(&self) -> i32 {
        self.snapshot.new_start
    }

    pub fn preedit_start(&self) -> Option<i32> {
        self.preedit_start
    }

    pub fn expected(&self) -> Option<(i32, i32)> {
        self.expected
    }

    /// Record the outcome of a render, in the same synchronous turn as the
    /// host mutations, so the resulting notification can never race us.
    ///
    /// `deletion_offset` is the cursor-relative deletion start (<= 0, or 0
    /// when no deletion), `committed_chars` the codepoints committed, and
    /// `preedit_chars`/`preedit_cursor` the new composition (`None` when the
    /// render left composing text untouched).
    ///
    /// Returns the absolute caret position the render produces.
    pub fn on_render(
        &mut self,
        deletion_offset: i32,
        committed_chars: usize,
        preedit: Option<(usize, usize)>,
    ) -> i32 {
        // Edits replace the composing region when present, otherwise they
        // happen at the caret.
        let base = self.preedit_start.unwrap_or(self.snapshot.new_start);
        let head = base + deletion_offset + committed_chars as i32;

        let caret = match preedit {
            Some((chars, cursor)) => {
                self.preedit_start = Some(head);
                self.preedit_len = chars as i32;
                head + cursor as i32
            }
            None => {
                self.preedit_start = None;
                self.preedit_len = 0;
                head
            }
        };

        self.expected = Some((caret, caret));
        // The host will re-report this; keep our own view current already.
        self.snapshot.new_start = caret;
        self.snapshot.new_end = caret;
        caret
    }

    /// Classify a host selection notification.
    pub fn on_selection_changed(&mut self, snap: SelectionSnapshot) -> SelectionAction {
        self.snapshot = snap;

        if self.expected == Some((snap.new_start, snap.new_end)) {
            return SelectionAction::DoNothing;
        }

        // A bare caret move within (or at the edges of) the tracked preedit
        // realigns the engine cursor instead of dropping the composition.
        if let Some(start) = self.preedit_start {
            let is_caret = snap.new_start == snap.new_end;
            let within = start <= snap.new_start && snap.new_start <= start + self.preedit_len;
            if is_caret && within {
                return SelectionAction::MoveCursor((snap.new_start - start) as usize);
            }
        }

        debug!(?snap, expected = ?self.expected, "unexplained selection change");
        self.preedit_start = None;
        self.preedit_len = 0;
        self.expected = None;
        SelectionAction::ResetContext
    }
}
