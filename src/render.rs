//! Applying one engine reply to the text field as a single batch.
//!
//! Ordering inside the batch is fixed: delete, commit, set-composing,
//! set-selection. Every host call may fail; failures are logged and the
//! batch continues, because aborting here would leave the field and the
//! engine further apart, not closer.

use tracing::{debug, warn};

use crate::gateway::{CursorAnchor, EngineReply, Preedit, SegmentAnnotation};
use crate::host::{ComposingText, TextFieldHost};
use crate::selection::SelectionTracker;
use crate::session::Pending;

#[derive(Debug, Default)]
pub struct RenderCoordinator;

impl RenderCoordinator {
    pub fn new() -> Self {
        RenderCoordinator
    }

    /// Terminal action for one reply. Forward-only dispositions never touch
    /// the composition; render dispositions apply the full batch.
    pub fn apply(
        &self,
        host: &mut dyn TextFieldHost,
        tracker: &mut SelectionTracker,
        reply: &EngineReply,
        pending: &Pending,
    ) {
        if !reply.consumed {
            self.forward_unconsumed(host, tracker, reply, pending);
            return;
        }
        self.render(host, tracker, reply, pending);
    }

    /// The engine declined the key: commit any literal text it still sent,
    /// then hand the original key to the application exactly once.
    fn forward_unconsumed(
        &self,
        host: &mut dyn TextFieldHost,
        tracker: &mut SelectionTracker,
        reply: &EngineReply,
        pending: &Pending,
    ) {
        if let Some(result) = &reply.result {
            if !result.text.is_empty() {
                if host.commit_text(&result.text, CursorAnchor::Tail) {
                    // This commit moves the caret too; register the echo so
                    // it is never classified as an external change.
                    tracker.on_render(0, result.text.chars().count(), None);
                } else {
                    warn!("commit_text failed on forward path");
                }
            }
        }
        if let Some(key) = &pending.triggering_key {
            host.forward_key_to_application(key);
        }
    }

    fn render(
        &self,
        host: &mut dyn TextFieldHost,
        tracker: &mut SelectionTracker,
        reply: &EngineReply,
        pending: &Pending,
    ) {
        if !host.begin_batch_edit() {
            warn!("begin_batch_edit failed");
        }

        // 1. Deletion anchored at the cursor.
        let mut deletion_offset = 0;
        if let Some(range) = &reply.deletion {
            if range.is_anchored_at_cursor() {
                deletion_offset = range.offset;
                if !host.delete_surrounding_text(
                    range.chars_before_cursor(),
                    range.chars_after_cursor(),
                ) {
                    warn!("delete_surrounding_text failed");
                }
            } else {
                warn!(
                    offset = range.offset,
                    length = range.length,
                    "deletion range not anchored at cursor, skipped"
                );
            }
        }

        // 2. Committed result text. The caret advances past the commit
        // except for a head anchor, which leaves it at the insertion point.
        let mut caret_advance = 0;
        if let Some(result) = &reply.result {
            if !result.text.is_empty() {
                let anchor = match result.anchor {
                    Some(CursorAnchor::Head) if reply.preedit.is_some() => {
                        // Head placement cannot coexist with composing text.
                        warn!("head cursor hint with preedit, degrading to tail");
                        CursorAnchor::Tail
                    }
                    Some(anchor) => anchor,
                    None => CursorAnchor::Tail,
                };
                if !host.commit_text(&result.text, anchor) {
                    warn!("commit_text failed");
                }
                if anchor == CursorAnchor::Tail {
                    caret_advance = result.text.chars().count();
                }
            }
        }

        // 3/4. Composing text.
        let preedit_metrics = match &reply.preedit {
            None => {
                // A pure spec switch sends an empty preedit on purpose;
                // clearing here would erase a field's pre-existing selection.
                if !pending.spec_only
                    && !host.set_composing_text(&ComposingText::cleared(), CursorAnchor::Tail)
                {
                    warn!("set_composing_text (clear) failed");
                }
                None
            }
            Some(preedit) => {
                let composing = build_composing_text(preedit);
                let anchor = if preedit.cursor == 0 {
                    CursorAnchor::Head
                } else {
                    CursorAnchor::Tail
                };
                if !host.set_composing_text(&composing, anchor) {
                    warn!("set_composing_text failed");
                }
                Some((preedit.char_len(), preedit.cursor))
            }
        };

        // 5. Register the expected selection before the host can possibly
        // echo it back, then place interior carets explicitly: composing-text
        // anchors can only express head or tail.
        if pending.spec_only && preedit_metrics.is_none() {
            debug!("spec-only reply, composition and selection untouched");
        } else {
            let caret = tracker.on_render(deletion_offset, caret_advance, preedit_metrics);
            if let Some((chars, cursor)) = preedit_metrics {
                if cursor > 0 && cursor < chars && !host.set_selection(caret, caret) {
                    warn!("set_selection failed");
                }
            }
        }

        if !host.end_batch_edit() {
            warn!("end_batch_edit failed");
        }
    }
}

/// Concatenate segments, highlight the annotated one, underline the span.
fn build_composing_text(preedit: &Preedit) -> ComposingText {
    let text = preedit.concatenated();

    let mut highlight = None;
    let mut offset = 0;
    for segment in &preedit.segments {
        let len = segment.text.chars().count();
        if segment.annotation == Some(SegmentAnnotation::Highlight) {
            highlight = Some(offset..offset + len);
            break;
        }
        offset += len;
    }

    ComposingText {
        text,
        highlight,
        underline: true,
    }
}
