//! Input-session synchronization core for a mobile Japanese IME.
//!
//! `ImeSession` sits between a text-field host (the platform editor) and an
//! asynchronous conversion engine. It routes key events into engine requests,
//! applies the engine's replies to the field as atomic edit batches, keeps the
//! field's best-effort selection notifications consistent with the engine
//! session, and arbitrates which candidate surface (keyboard, number picker,
//! floating) is showing.
//!
//! Drawing, theming, and the engine's wire protocol live elsewhere; this crate
//! only consumes their contracts (`TextFieldHost`, `ViewProxy`,
//! `SessionGateway`).

pub mod candidates;
pub mod gateway;
pub mod host;
pub mod keyevent;
pub mod keymap;
pub mod render;
pub mod router;
pub mod selection;
pub mod session;
pub mod spec;
pub mod trace_init;

#[cfg(test)]
mod tests;

pub use candidates::{
    Candidate, CandidateList, CandidateMode, CandidateModeController, CandidateModeError,
    FoldState, SurfaceCommand,
};
pub use gateway::{
    CursorAnchor, DeletionRange, Disposition, EngineReply, Preedit, PreeditSegment, ResultText,
    SegmentAnnotation, SessionGateway, UsageEvent,
};
pub use host::{ComposingText, FieldAttributes, TextFieldHost, ViewProxy};
pub use keyevent::{KeyContent, KeyEvent, KeyOrigin, Modifiers, NamedKey, ProbableKey, RawEventRef};
pub use keymap::{HardwareKeymap, KeymapEntry, KeymapError};
pub use router::{EngineCall, KeyEventRouter, OutboundRequest, RouteOutcome, ViewIntent};
pub use selection::{SelectionAction, SelectionSnapshot, SelectionTracker};
pub use session::{ImeSession, Pending};
pub use spec::{
    CompositionMode, CrossingEdgeBehavior, KeyboardSpecification, MappingTable,
    SpaceOnAlphanumeric, SpecModel,
};
