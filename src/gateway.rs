//! Contract of the conversion engine's asynchronous request/reply channel,
//! plus the reply data model consumed by the render path.
//!
//! The wire format is the engine's business; this crate only sees the shapes
//! below. Replies for `submit_key` / `submit_composition` /
//! `update_specification` / `log_usage` arrive later, serialized FIFO, via
//! `ImeSession::on_engine_reply`. The remaining calls are fire-and-forget.

use crate::candidates::CandidateList;
use crate::keyevent::KeyEvent;
use crate::spec::KeyboardSpecification;

/// Where a cursor lands relative to text affected by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAnchor {
    Head,
    Tail,
}

/// Deletion anchored at the current cursor: `offset` is the (non-positive)
/// start relative to the cursor, `length` the codepoint count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionRange {
    pub offset: i32,
    pub length: i32,
}

impl DeletionRange {
    /// A range is usable only if it covers the cursor: start at or before it,
    /// end at or after it. The arithmetic is widened so hostile values near
    /// `i32::MIN` cannot wrap into a range that passes validation.
    pub fn is_anchored_at_cursor(&self) -> bool {
        self.offset <= 0 && i64::from(self.offset) + i64::from(self.length) >= 0
    }

    /// Codepoints to delete before the cursor.
    pub fn chars_before_cursor(&self) -> usize {
        (-i64::from(self.offset)) as usize
    }

    /// Codepoints to delete after the cursor.
    pub fn chars_after_cursor(&self) -> usize {
        (i64::from(self.offset) + i64::from(self.length)) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAnnotation {
    Highlight,
    Underline,
}

/// One conversion unit of the preedit.
#[derive(Debug, Clone, PartialEq)]
pub struct PreeditSegment {
    pub text: String,
    pub annotation: Option<SegmentAnnotation>,
}

/// Provisional text plus a cursor measured in codepoints within the
/// concatenated segment text.
#[derive(Debug, Clone, PartialEq)]
pub struct Preedit {
    pub segments: Vec<PreeditSegment>,
    pub cursor: usize,
}

impl Preedit {
    pub fn concatenated(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }
}

/// Finalized text carried by a reply, with an optional cursor-offset hint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultText {
    pub text: String,
    /// `None` means the default (tail).
    pub anchor: Option<CursorAnchor>,
}

/// One engine reply. Field combinations mirror what the engine may send;
/// the render path tolerates any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineReply {
    pub consumed: bool,
    pub result: Option<ResultText>,
    pub deletion: Option<DeletionRange>,
    pub preedit: Option<Preedit>,
    pub candidates: Option<CandidateList>,
}

impl EngineReply {
    pub fn consumed() -> Self {
        EngineReply {
            consumed: true,
            ..EngineReply::default()
        }
    }

    pub fn not_consumed() -> Self {
        EngineReply::default()
    }
}

/// What must happen to a request's eventual reply. Exactly one disposition is
/// created per reply-bearing request, and exactly one terminal action is
/// taken per reply (stale generations excepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    RenderToField,
    ForwardKeyToApplication,
    ForwardKeyToView,
    TelemetryOnly,
}

/// Usage-statistics events emitted for view-local actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageEvent {
    SymbolViewOpened,
    MenuOpened,
    UndoTriggered,
    NumberPickerOpened,
    NumberPickerClosed,
}

/// The conversion engine's session channel. All methods are fire-and-forget;
/// the first four produce exactly one reply each, delivered later in FIFO
/// order.
pub trait SessionGateway {
    /// Send a content key. `spec` is present when a specification change is
    /// folded into the same request, so the engine applies the key under the
    /// new spec atomically.
    fn submit_key(&mut self, key: &KeyEvent, spec: Option<&KeyboardSpecification>);

    /// Finalize the current composition into result text.
    fn submit_composition(&mut self);

    /// Pure specification change, no content key.
    fn update_specification(&mut self, spec: &KeyboardSpecification);

    /// Telemetry-only round trip; the reply carries no render payload.
    fn log_usage(&mut self, event: UsageEvent);

    /// Drop engine-side composition state. No reply.
    fn reset_context(&mut self);

    /// Realign the engine's preedit cursor (codepoints from preedit head).
    /// No reply.
    fn move_cursor(&mut self, position: usize);

    /// Periodic best-effort persistence tick. No reply; safe to call
    /// immediately before or after `reset_context`.
    fn sync_data(&mut self);
}
