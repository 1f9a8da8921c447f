//! Key event routing: raw press → engine requests plus disposition tags.
//!
//! The router is stateless apart from the keymap table it holds; the
//! specification model it mutates is passed in by the session. It decides
//! per event whether to hand the key back to the application, resolve it
//! inside the view layer, or dispatch one or two engine requests.

use tracing::debug_span;

use crate::gateway::{Disposition, UsageEvent};
use crate::keyevent::{
    softcode, KeyContent, KeyEvent, Modifiers, NamedKey, ProbableKey, RawEventRef,
};
use crate::keymap::{HardwareKeymap, KeymapEntry};
use crate::spec::{CompositionMode, KeyboardSpecification, SpecModel};

/// Actions resolved entirely inside the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewIntent {
    ShowMenu,
    ToggleSymbolView,
    Undo,
    OpenNumberPicker,
    CloseNumberPicker,
    /// Switch the software keyboard to this composition mode. The view picks
    /// the matching layout and reports it back via the session.
    SwitchMode(CompositionMode),
}

/// Engine call the session should make for one routed request.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    SubmitKey {
        key: KeyEvent,
        /// Present when a spec change is folded into the same request.
        spec: Option<KeyboardSpecification>,
    },
    SubmitComposition,
    UpdateSpecification(KeyboardSpecification),
}

/// One engine round trip to dispatch, with everything its reply will need.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub call: EngineCall,
    pub disposition: Disposition,
    /// Key to forward if the engine declines the event.
    pub triggering_key: Option<KeyEvent>,
    /// True for pure spec/mode switches whose deliberately-empty preedit
    /// must not clear the field's composing text.
    pub spec_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Hand the raw event straight back to the host application.
    Passthrough,
    /// Consumed by the view layer, optionally with a telemetry round trip.
    Local {
        intent: ViewIntent,
        telemetry: Option<UsageEvent>,
    },
    /// Dispatch these requests to the engine, in order.
    Dispatch(Vec<OutboundRequest>),
}

pub struct KeyEventRouter {
    keymap: &'static HardwareKeymap,
}

impl Default for KeyEventRouter {
    fn default() -> Self {
        KeyEventRouter::new()
    }
}

impl KeyEventRouter {
    pub fn new() -> Self {
        KeyEventRouter {
            keymap: HardwareKeymap::global(),
        }
    }

    /// Route a hardware key press. Unmapped pairs and bare modifiers are not
    /// consumed; their forward-to-application disposition resolves here, with
    /// no round trip.
    pub fn route_hardware(
        &self,
        specs: &mut SpecModel,
        scan_code: u32,
        modifiers: Modifiers,
        raw: RawEventRef,
    ) -> RouteOutcome {
        let _span = debug_span!("route_hardware", scan_code, mask = modifiers.mask()).entered();

        let Some(entry) = self.keymap.get(scan_code, modifiers.mask()) else {
            return RouteOutcome::Passthrough;
        };

        match entry {
            KeymapEntry::ModeToggle => self.toggle_hardware_mode(specs),
            KeymapEntry::Named(key) => {
                let event = KeyEvent::hardware(KeyContent::Named(key), modifiers, raw);
                self.dispatch_content(specs, event)
            }
            KeymapEntry::Literal(c) => {
                let event = KeyEvent::hardware(KeyContent::Codepoint(c), modifiers, raw);
                self.dispatch_content(specs, event)
            }
        }
    }

    /// Route a software key press. Negative codes are specials or view-local
    /// actions; positive codes are literal codepoints with optional touch
    /// samples. `candidates_expanded` redirects vertical keys to the view
    /// layer, which owns list paging while a docked surface is open.
    pub fn route_software(
        &self,
        specs: &mut SpecModel,
        code: i32,
        probable_keys: Vec<ProbableKey>,
        candidates_expanded: bool,
    ) -> RouteOutcome {
        let _span = debug_span!("route_software", code).entered();

        if let Some(intent) = view_local_intent(code) {
            return RouteOutcome::Local {
                intent,
                telemetry: usage_for_intent(intent),
            };
        }

        // Paging keys still travel the engine queue so the page flip stays
        // ordered behind in-flight renders and the engine keeps its focus
        // state current; the reply hands the key to the view, not the field.
        if candidates_expanded && (code == softcode::UP || code == softcode::DOWN) {
            let named = if code == softcode::UP {
                NamedKey::Up
            } else {
                NamedKey::Down
            };
            let event = KeyEvent::software(KeyContent::Named(named), probable_keys);
            return RouteOutcome::Dispatch(vec![OutboundRequest {
                triggering_key: Some(event.clone()),
                call: EngineCall::SubmitKey {
                    key: event,
                    spec: None,
                },
                disposition: Disposition::ForwardKeyToView,
                spec_only: false,
            }]);
        }

        let content = match code {
            softcode::SPACE => KeyContent::Named(NamedKey::Space),
            softcode::ENTER => KeyContent::Named(NamedKey::Enter),
            softcode::BACKSPACE => KeyContent::Named(NamedKey::Backspace),
            softcode::LEFT => KeyContent::Named(NamedKey::Left),
            softcode::RIGHT => KeyContent::Named(NamedKey::Right),
            softcode::UP => KeyContent::Named(NamedKey::Up),
            softcode::DOWN => KeyContent::Named(NamedKey::Down),
            _ => match u32::try_from(code).ok().and_then(char::from_u32) {
                Some(c) if code > 0 => KeyContent::Codepoint(c),
                _ => return RouteOutcome::Passthrough,
            },
        };

        let event = KeyEvent::software(content, probable_keys);
        self.dispatch_content(specs, event)
    }

    /// The kana/alphabet toggle flips the hardware composition mode without a
    /// content key; only the spec change goes out.
    fn toggle_hardware_mode(&self, specs: &mut SpecModel) -> RouteOutcome {
        let flipped = match specs.hardware().mode {
            CompositionMode::HalfAscii => CompositionMode::Hiragana,
            _ => CompositionMode::HalfAscii,
        };
        specs.set_from_hardware(KeyboardSpecification::hardware(flipped));
        match specs.push_if_changed(specs.hardware()) {
            Some(spec) => RouteOutcome::Dispatch(vec![OutboundRequest {
                call: EngineCall::UpdateSpecification(spec),
                disposition: Disposition::RenderToField,
                triggering_key: None,
                spec_only: true,
            }]),
            // Toggle under an already-active identical spec; nothing to send.
            None => RouteOutcome::Dispatch(Vec::new()),
        }
    }

    /// Common path for events that derived a content key.
    fn dispatch_content(&self, specs: &mut SpecModel, event: KeyEvent) -> RouteOutcome {
        if !event.is_content_key() {
            return RouteOutcome::Passthrough;
        }

        let resolved = specs.for_origin(event.origin);
        let previous = specs.active();

        match specs.push_if_changed(resolved) {
            None => {
                // Spec unchanged: plain key request.
                RouteOutcome::Dispatch(vec![OutboundRequest {
                    triggering_key: Some(event.clone()),
                    call: EngineCall::SubmitKey {
                        key: event,
                        spec: None,
                    },
                    disposition: Disposition::RenderToField,
                    spec_only: false,
                }])
            }
            Some(spec) => {
                let mut requests = Vec::with_capacity(2);
                // Crossing from the software path to a hardware key: flush
                // whatever composition the software keyboard built before the
                // engine reinterprets keys under the hardware spec.
                let crossing = previous
                    .is_some_and(|p| p.origin != spec.origin)
                    && spec.origin == crate::keyevent::KeyOrigin::Hardware;
                if crossing {
                    requests.push(OutboundRequest {
                        call: EngineCall::SubmitComposition,
                        disposition: Disposition::RenderToField,
                        triggering_key: None,
                        spec_only: false,
                    });
                }
                // Fold the key into the spec-change request so the engine
                // applies it under the new spec atomically.
                requests.push(OutboundRequest {
                    triggering_key: Some(event.clone()),
                    call: EngineCall::SubmitKey {
                        key: event,
                        spec: Some(spec),
                    },
                    disposition: Disposition::RenderToField,
                    spec_only: false,
                });
                RouteOutcome::Dispatch(requests)
            }
        }
    }
}

fn view_local_intent(code: i32) -> Option<ViewIntent> {
    let intent = match code {
        softcode::SYMBOL_VIEW => ViewIntent::ToggleSymbolView,
        softcode::MENU => ViewIntent::ShowMenu,
        softcode::UNDO => ViewIntent::Undo,
        softcode::NUMBER_PICKER_OPEN => ViewIntent::OpenNumberPicker,
        softcode::NUMBER_PICKER_CLOSE => ViewIntent::CloseNumberPicker,
        softcode::MODE_KANA => ViewIntent::SwitchMode(CompositionMode::Hiragana),
        softcode::MODE_ALPHABET => ViewIntent::SwitchMode(CompositionMode::HalfAscii),
        _ => return None,
    };
    Some(intent)
}

fn usage_for_intent(intent: ViewIntent) -> Option<UsageEvent> {
    match intent {
        ViewIntent::ToggleSymbolView => Some(UsageEvent::SymbolViewOpened),
        ViewIntent::ShowMenu => Some(UsageEvent::MenuOpened),
        ViewIntent::Undo => Some(UsageEvent::UndoTriggered),
        ViewIntent::OpenNumberPicker => Some(UsageEvent::NumberPickerOpened),
        ViewIntent::CloseNumberPicker => Some(UsageEvent::NumberPickerClosed),
        ViewIntent::SwitchMode(_) => None,
    }
}
