mod candidates;
mod spec_model;

use std::collections::HashSet;

use crate::candidates::SurfaceCommand;
use crate::gateway::{
    CursorAnchor, DeletionRange, EngineReply, Preedit, PreeditSegment, ResultText,
    SegmentAnnotation, SessionGateway, UsageEvent,
};
use crate::host::{ComposingText, TextFieldHost, ViewProxy};
use crate::keyevent::KeyEvent;
use crate::router::ViewIntent;
use crate::spec::{CompositionMode, KeyboardSpecification};

// --- Gateway double: records every engine call ---

#[derive(Debug, Clone, PartialEq)]
pub(super) enum GatewayCall {
    SubmitKey {
        key: KeyEvent,
        spec: Option<KeyboardSpecification>,
    },
    SubmitComposition,
    UpdateSpecification(KeyboardSpecification),
    LogUsage(UsageEvent),
    ResetContext,
    MoveCursor(usize),
    SyncData,
}

#[derive(Default)]
pub(super) struct RecordingGateway {
    pub(super) calls: Vec<GatewayCall>,
}

impl RecordingGateway {
    pub(super) fn new() -> Self {
        RecordingGateway::default()
    }

    pub(super) fn count(&self, matcher: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.iter().filter(|c| matcher(c)).count()
    }
}

impl SessionGateway for RecordingGateway {
    fn submit_key(&mut self, key: &KeyEvent, spec: Option<&KeyboardSpecification>) {
        self.calls.push(GatewayCall::SubmitKey {
            key: key.clone(),
            spec: spec.copied(),
        });
    }

    fn submit_composition(&mut self) {
        self.calls.push(GatewayCall::SubmitComposition);
    }

    fn update_specification(&mut self, spec: &KeyboardSpecification) {
        self.calls.push(GatewayCall::UpdateSpecification(*spec));
    }

    fn log_usage(&mut self, event: UsageEvent) {
        self.calls.push(GatewayCall::LogUsage(event));
    }

    fn reset_context(&mut self) {
        self.calls.push(GatewayCall::ResetContext);
    }

    fn move_cursor(&mut self, position: usize) {
        self.calls.push(GatewayCall::MoveCursor(position));
    }

    fn sync_data(&mut self) {
        self.calls.push(GatewayCall::SyncData);
    }
}

// --- Host double: a tiny editable buffer plus a call log ---

#[derive(Debug, Clone, PartialEq)]
pub(super) enum HostCall {
    BeginBatch,
    EndBatch,
    DeleteSurrounding { before: usize, after: usize },
    CommitText { text: String, anchor: CursorAnchor },
    SetComposing { text: String, anchor: CursorAnchor },
    SetSelection { start: i32, end: i32 },
    ForwardKey,
}

pub(super) struct FakeHost {
    buffer: Vec<char>,
    sel_start: usize,
    sel_end: usize,
    composing: Option<(usize, usize)>,
    pub(super) calls: Vec<HostCall>,
    pub(super) forwarded: Vec<KeyEvent>,
    /// Method names that report failure (and skip the mutation).
    pub(super) refuse: HashSet<&'static str>,
}

impl FakeHost {
    pub(super) fn new() -> Self {
        FakeHost {
            buffer: Vec::new(),
            sel_start: 0,
            sel_end: 0,
            composing: None,
            calls: Vec::new(),
            forwarded: Vec::new(),
            refuse: HashSet::new(),
        }
    }

    pub(super) fn with_text(text: &str) -> Self {
        let mut host = FakeHost::new();
        host.buffer = text.chars().collect();
        host.sel_start = host.buffer.len();
        host.sel_end = host.buffer.len();
        host
    }

    pub(super) fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub(super) fn selection(&self) -> (i32, i32) {
        (self.sel_start as i32, self.sel_end as i32)
    }

    pub(super) fn composing_span(&self) -> Option<(usize, usize)> {
        self.composing
    }

    fn insert(&mut self, pos: usize, text: &str) -> usize {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        self.buffer.splice(pos..pos, chars);
        len
    }
}

impl TextFieldHost for FakeHost {
    fn begin_batch_edit(&mut self) -> bool {
        self.calls.push(HostCall::BeginBatch);
        !self.refuse.contains("begin_batch_edit")
    }

    fn end_batch_edit(&mut self) -> bool {
        self.calls.push(HostCall::EndBatch);
        !self.refuse.contains("end_batch_edit")
    }

    fn delete_surrounding_text(&mut self, before: usize, after: usize) -> bool {
        self.calls.push(HostCall::DeleteSurrounding { before, after });
        if self.refuse.contains("delete_surrounding_text") {
            return false;
        }
        let b = before.min(self.sel_start);
        let del_start = self.sel_start - b;
        self.buffer.drain(del_start..self.sel_start);
        self.sel_start -= b;
        self.sel_end -= b;
        if let Some((s, e)) = self.composing {
            if s >= del_start {
                self.composing = Some((s - b, e - b));
            }
        }
        let a = after.min(self.buffer.len().saturating_sub(self.sel_end));
        self.buffer.drain(self.sel_end..self.sel_end + a);
        true
    }

    fn commit_text(&mut self, text: &str, anchor: CursorAnchor) -> bool {
        self.calls.push(HostCall::CommitText {
            text: text.to_string(),
            anchor,
        });
        if self.refuse.contains("commit_text") {
            return false;
        }
        let pos = match self.composing.take() {
            Some((s, e)) => {
                self.buffer.drain(s..e);
                s
            }
            None => {
                self.buffer.drain(self.sel_start..self.sel_end);
                self.sel_start
            }
        };
        let len = self.insert(pos, text);
        let caret = match anchor {
            CursorAnchor::Tail => pos + len,
            CursorAnchor::Head => pos,
        };
        self.sel_start = caret;
        self.sel_end = caret;
        true
    }

    fn set_composing_text(&mut self, text: &ComposingText, anchor: CursorAnchor) -> bool {
        self.calls.push(HostCall::SetComposing {
            text: text.text.clone(),
            anchor,
        });
        if self.refuse.contains("set_composing_text") {
            return false;
        }
        let pos = match self.composing.take() {
            Some((s, e)) => {
                self.buffer.drain(s..e);
                s
            }
            None => self.sel_start,
        };
        let len = self.insert(pos, &text.text);
        if len > 0 {
            self.composing = Some((pos, pos + len));
        }
        let caret = match anchor {
            CursorAnchor::Tail => pos + len,
            CursorAnchor::Head => pos,
        };
        self.sel_start = caret;
        self.sel_end = caret;
        true
    }

    fn set_selection(&mut self, start: i32, end: i32) -> bool {
        self.calls.push(HostCall::SetSelection { start, end });
        if self.refuse.contains("set_selection") {
            return false;
        }
        self.sel_start = (start.max(0) as usize).min(self.buffer.len());
        self.sel_end = (end.max(0) as usize).min(self.buffer.len());
        true
    }

    fn forward_key_to_application(&mut self, event: &KeyEvent) {
        self.calls.push(HostCall::ForwardKey);
        self.forwarded.push(event.clone());
    }
}

// --- View double ---

#[derive(Debug, Clone, PartialEq)]
pub(super) enum ViewEvent {
    Intent(ViewIntent),
    Key(KeyEvent),
    Surface(SurfaceCommand),
    ModeIcon(CompositionMode),
}

#[derive(Default)]
pub(super) struct RecordingView {
    pub(super) events: Vec<ViewEvent>,
}

impl RecordingView {
    pub(super) fn new() -> Self {
        RecordingView::default()
    }
}

impl ViewProxy for RecordingView {
    fn handle_intent(&mut self, intent: ViewIntent) {
        self.events.push(ViewEvent::Intent(intent));
    }

    fn forward_key(&mut self, event: &KeyEvent) {
        self.events.push(ViewEvent::Key(event.clone()));
    }

    fn apply_surface(&mut self, command: &SurfaceCommand) {
        self.events.push(ViewEvent::Surface(command.clone()));
    }

    fn update_mode_icon(&mut self, mode: CompositionMode) {
        self.events.push(ViewEvent::ModeIcon(mode));
    }
}

// --- Reply builders ---

pub(super) fn segment(text: &str, annotation: Option<SegmentAnnotation>) -> PreeditSegment {
    PreeditSegment {
        text: text.to_string(),
        annotation,
    }
}

pub(super) fn plain_preedit(text: &str, cursor: usize) -> Preedit {
    Preedit {
        segments: vec![segment(text, Some(SegmentAnnotation::Underline))],
        cursor,
    }
}

pub(super) fn reply_with_preedit(text: &str, cursor: usize) -> EngineReply {
    EngineReply {
        preedit: Some(plain_preedit(text, cursor)),
        ..EngineReply::consumed()
    }
}

pub(super) fn reply_with_result(text: &str, anchor: Option<CursorAnchor>) -> EngineReply {
    EngineReply {
        result: Some(ResultText {
            text: text.to_string(),
            anchor,
        }),
        ..EngineReply::consumed()
    }
}

pub(super) fn deletion(offset: i32, length: i32) -> DeletionRange {
    DeletionRange { offset, length }
}
