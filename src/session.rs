//! The session coordinator tying the components together.
//!
//! One `ImeSession` lives per bound input field stream. A single logical
//! thread drives it: key intake, selection notifications, and engine replies
//! all arrive serialized. Engine replies are matched FIFO against the
//! pending-disposition queue; the queue is never cleared on reset — entries
//! are instead generation-tagged and stale replies discarded as they arrive,
//! so queue and reply stream stay aligned.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::candidates::{CandidateList, CandidateModeController, SurfaceCommand};
use crate::gateway::{Disposition, EngineReply, SessionGateway};
use crate::host::{FieldAttributes, TextFieldHost, ViewProxy};
use crate::keyevent::{KeyEvent, Modifiers, ProbableKey, RawEventRef};
use crate::render::RenderCoordinator;
use crate::router::{EngineCall, KeyEventRouter, OutboundRequest, RouteOutcome, ViewIntent};
use crate::selection::{SelectionAction, SelectionSnapshot, SelectionTracker};
use crate::spec::{KeyboardSpecification, SpecModel};

/// Everything a reply needs when it arrives: the disposition tag, the key to
/// forward if declined, and the generation it belongs to.
#[derive(Debug, Clone)]
pub struct Pending {
    pub disposition: Disposition,
    pub triggering_key: Option<KeyEvent>,
    pub spec_only: bool,
    generation: u64,
}

impl Pending {
    pub(crate) fn new(
        disposition: Disposition,
        triggering_key: Option<KeyEvent>,
        spec_only: bool,
        generation: u64,
    ) -> Self {
        Pending {
            disposition,
            triggering_key,
            spec_only,
            generation,
        }
    }
}

pub struct ImeSession<G: SessionGateway> {
    gateway: G,
    specs: SpecModel,
    router: KeyEventRouter,
    tracker: SelectionTracker,
    render: RenderCoordinator,
    candidates: CandidateModeController,
    pending: VecDeque<Pending>,
    /// Bumped on teardown/reset; replies from older generations are defused.
    generation: u64,
    narrow: bool,
}

impl<G: SessionGateway> ImeSession<G> {
    pub fn new(gateway: G) -> Self {
        ImeSession {
            gateway,
            specs: SpecModel::new(),
            router: KeyEventRouter::new(),
            tracker: SelectionTracker::new(),
            render: RenderCoordinator::new(),
            candidates: CandidateModeController::new(),
            pending: VecDeque::new(),
            generation: 0,
            narrow: false,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn specs(&self) -> &SpecModel {
        &self.specs
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn candidates(&self) -> &CandidateModeController {
        &self.candidates
    }

    // --- Key intake ---

    /// Hardware key press. Returns true when the event was consumed; false
    /// hands it back to the host for default processing.
    pub fn on_hard_key_down(
        &mut self,
        scan_code: u32,
        modifiers: Modifiers,
        raw: RawEventRef,
        view: &mut dyn ViewProxy,
    ) -> bool {
        let outcome = self
            .router
            .route_hardware(&mut self.specs, scan_code, modifiers, raw);
        self.handle_outcome(outcome, view)
    }

    /// Software key press from the on-screen keyboard.
    pub fn on_soft_key(
        &mut self,
        code: i32,
        probable_keys: Vec<ProbableKey>,
        view: &mut dyn ViewProxy,
    ) -> bool {
        let paging = self.candidates.pages_with_vertical_keys();
        let outcome = self
            .router
            .route_software(&mut self.specs, code, probable_keys, paging);
        self.handle_outcome(outcome, view)
    }

    fn handle_outcome(&mut self, outcome: RouteOutcome, view: &mut dyn ViewProxy) -> bool {
        match outcome {
            RouteOutcome::Passthrough => false,
            RouteOutcome::Local { intent, telemetry } => {
                self.apply_intent(intent, view);
                if let Some(event) = telemetry {
                    self.enqueue(Disposition::TelemetryOnly, None, false);
                    self.gateway.log_usage(event);
                }
                true
            }
            RouteOutcome::Dispatch(requests) => {
                for request in requests {
                    self.dispatch(request);
                }
                true
            }
        }
    }

    fn apply_intent(&mut self, intent: ViewIntent, view: &mut dyn ViewProxy) {
        match intent {
            ViewIntent::OpenNumberPicker => {
                let commands = self.candidates.open_number_picker();
                apply_surface_commands(view, &commands);
            }
            ViewIntent::CloseNumberPicker => {
                let commands = self.candidates.close_number_picker();
                apply_surface_commands(view, &commands);
            }
            _ => {}
        }
        view.handle_intent(intent);
    }

    fn dispatch(&mut self, request: OutboundRequest) {
        // Enqueue before the gateway call: a synchronous test double may
        // answer within the call itself.
        self.enqueue(request.disposition, request.triggering_key, request.spec_only);
        match request.call {
            EngineCall::SubmitKey { key, spec } => self.gateway.submit_key(&key, spec.as_ref()),
            EngineCall::SubmitComposition => self.gateway.submit_composition(),
            EngineCall::UpdateSpecification(spec) => self.gateway.update_specification(&spec),
        }
    }

    fn enqueue(&mut self, disposition: Disposition, key: Option<KeyEvent>, spec_only: bool) {
        self.pending
            .push_back(Pending::new(disposition, key, spec_only, self.generation));
    }

    // --- Engine replies ---

    /// One engine reply, FIFO-matched against the pending queue. Exactly one
    /// terminal action is taken, unless the entry was defused by a reset.
    pub fn on_engine_reply(
        &mut self,
        reply: EngineReply,
        host: &mut dyn TextFieldHost,
        view: &mut dyn ViewProxy,
    ) {
        let Some(pending) = self.pending.pop_front() else {
            warn!("engine reply with no pending request, dropped");
            return;
        };
        if pending.generation != self.generation {
            debug!(
                generation = pending.generation,
                current = self.generation,
                "defused stale reply"
            );
            return;
        }

        match pending.disposition {
            Disposition::TelemetryOnly => {
                debug!("telemetry reply absorbed");
            }
            Disposition::ForwardKeyToView => {
                if let Some(key) = &pending.triggering_key {
                    view.forward_key(key);
                }
            }
            Disposition::RenderToField | Disposition::ForwardKeyToApplication => {
                self.render.apply(host, &mut self.tracker, &reply, &pending);
                if reply.consumed && pending.disposition == Disposition::RenderToField {
                    let list = reply.candidates.clone().unwrap_or_else(CandidateList::empty);
                    let commands = self.candidates.update_candidates(list);
                    apply_surface_commands(view, &commands);
                }
            }
        }
    }

    // --- Selection notifications (independent of the key pipeline) ---

    pub fn on_selection_changed(&mut self, snapshot: SelectionSnapshot, view: &mut dyn ViewProxy) {
        match self.tracker.on_selection_changed(snapshot) {
            SelectionAction::DoNothing => {}
            SelectionAction::MoveCursor(position) => {
                self.gateway.move_cursor(position);
            }
            SelectionAction::ResetContext => {
                debug!("external selection change, resetting context");
                self.reset_composition(view);
            }
        }
    }

    /// Abandon the composition: defuse in-flight replies, reset the engine,
    /// and empty the candidate surfaces. Idempotent, and safe to interleave
    /// with the periodic `sync_data` tick.
    fn reset_composition(&mut self, view: &mut dyn ViewProxy) {
        self.generation += 1;
        self.gateway.reset_context();
        let commands = self.candidates.update_candidates(CandidateList::empty());
        apply_surface_commands(view, &commands);
    }

    // --- Field lifecycle ---

    pub fn on_field_attached(&mut self, attributes: FieldAttributes, view: &mut dyn ViewProxy) {
        debug!(?attributes, "field attached");
        self.generation += 1;
        self.tracker
            .seed(attributes.selection_start, attributes.selection_end);
        self.gateway.reset_context();
        // First attach pushes the resolved spec; later attaches only when it
        // actually changed, so engine-side history survives focus hops.
        let resolved = self.specs.resolve_active(self.narrow);
        self.push_spec(resolved);
        let commands = self.candidates.update_candidates(CandidateList::empty());
        apply_surface_commands(view, &commands);
        view.update_mode_icon(self.specs.resolve_active(self.narrow).mode);
    }

    pub fn on_field_detached(&mut self) {
        debug!("field detached");
        self.generation += 1;
        self.tracker.reset();
        self.gateway.reset_context();
    }

    // --- View-driven state ---

    /// The view switched the software keyboard layout. A specification with
    /// a non-software origin here is a wiring bug; route it to the fallback
    /// rather than desynchronizing the model.
    pub fn on_software_layout_changed(
        &mut self,
        spec: KeyboardSpecification,
        view: &mut dyn ViewProxy,
    ) {
        let spec = if spec.origin == crate::keyevent::KeyOrigin::Software {
            spec
        } else {
            warn!(name = spec.name, "non-software spec from view, using fallback");
            KeyboardSpecification::fallback()
        };
        self.specs.set_from_software(spec);
        let resolved = self.specs.resolve_active(self.narrow);
        self.push_spec(resolved);
        view.update_mode_icon(resolved.mode);
    }

    /// The hardware keyboard configuration changed (connected, layout swap).
    pub fn on_hardware_layout_changed(
        &mut self,
        spec: KeyboardSpecification,
        view: &mut dyn ViewProxy,
    ) {
        self.specs.set_from_hardware(spec);
        let resolved = self.specs.resolve_active(self.narrow);
        self.push_spec(resolved);
        view.update_mode_icon(resolved.mode);
    }

    fn push_spec(&mut self, spec: KeyboardSpecification) {
        if let Some(spec) = self.specs.push_if_changed(spec) {
            debug!(name = spec.name, "pushing specification");
            self.enqueue(Disposition::RenderToField, None, true);
            self.gateway.update_specification(&spec);
        }
    }

    pub fn set_narrow_mode(&mut self, narrow: bool, view: &mut dyn ViewProxy) {
        self.narrow = narrow;
        let commands = self.candidates.set_narrow(narrow);
        apply_surface_commands(view, &commands);
        let resolved = self.specs.resolve_active(narrow);
        self.push_spec(resolved);
        view.update_mode_icon(resolved.mode);
    }

    pub fn set_floating_allowed(&mut self, allowed: bool, view: &mut dyn ViewProxy) {
        let commands = self.candidates.set_floating_allowed(allowed);
        apply_surface_commands(view, &commands);
    }

    pub fn set_extracted_mode(&mut self, extracted: bool, view: &mut dyn ViewProxy) {
        let commands = self.candidates.set_extracted(extracted);
        apply_surface_commands(view, &commands);
    }

    // --- Periodic maintenance ---

    /// Fixed-interval persistence tick. Not correctness-critical; the
    /// gateway call is stateless on our side, so it may land immediately
    /// before or after any reset.
    pub fn sync_data(&mut self) {
        self.gateway.sync_data();
    }
}

fn apply_surface_commands(view: &mut dyn ViewProxy, commands: &[SurfaceCommand]) {
    for command in commands {
        view.apply_surface(command);
    }
}
