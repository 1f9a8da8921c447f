//! Key events as the router sees them: origin, resolved content, modifiers,
//! and optional touch samples for probabilistic key correction.

/// Which input path produced a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Hardware,
    Software,
}

/// Active modifier set. `mask()` packs (shift, alt, ctrl) into the 3-bit
/// value used by the hardware keymap table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
        ctrl: false,
    };

    pub fn mask(&self) -> u8 {
        (self.shift as u8) | (self.alt as u8) << 1 | (self.ctrl as u8) << 2
    }

    pub fn is_empty(&self) -> bool {
        !self.shift && !self.alt && !self.ctrl
    }
}

/// Named special keys. Printable input travels as `KeyContent::Codepoint`
/// instead, including numpad digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Space,
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    NumpadEnter,
    /// F1..=F12.
    Function(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContent {
    Named(NamedKey),
    Codepoint(char),
}

/// One touch-model sample attached to a software key: an alternate codepoint
/// the press may have meant, with its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbableKey {
    pub codepoint: char,
    pub probability: f64,
}

/// Opaque handle to the original platform event, kept only so the host can
/// re-inject it unchanged on the forward-to-application path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEventRef(pub u64);

/// A single key press, immutable once built. Lives for exactly one engine
/// round trip (or is handed back synchronously when no content key exists).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub origin: KeyOrigin,
    /// `None` for bare modifiers; such events never reach the engine.
    pub content: Option<KeyContent>,
    pub modifiers: Modifiers,
    pub probable_keys: Vec<ProbableKey>,
    pub raw: Option<RawEventRef>,
}

impl KeyEvent {
    pub fn hardware(content: KeyContent, modifiers: Modifiers, raw: RawEventRef) -> Self {
        KeyEvent {
            origin: KeyOrigin::Hardware,
            content: Some(content),
            modifiers,
            probable_keys: Vec::new(),
            raw: Some(raw),
        }
    }

    /// A hardware event that resolved to no content key (bare modifier).
    pub fn hardware_modifier(modifiers: Modifiers, raw: RawEventRef) -> Self {
        KeyEvent {
            origin: KeyOrigin::Hardware,
            content: None,
            modifiers,
            probable_keys: Vec::new(),
            raw: Some(raw),
        }
    }

    pub fn software(content: KeyContent, probable_keys: Vec<ProbableKey>) -> Self {
        KeyEvent {
            origin: KeyOrigin::Software,
            content: Some(content),
            modifiers: Modifiers::NONE,
            probable_keys,
            raw: None,
        }
    }

    pub fn is_content_key(&self) -> bool {
        self.content.is_some()
    }
}

/// Software keyboard primary codes. Positive codes are literal codepoints;
/// the named specials and view-local actions use the reserved negatives.
pub mod softcode {
    pub const SPACE: i32 = -1;
    pub const ENTER: i32 = -2;
    pub const BACKSPACE: i32 = -3;
    pub const LEFT: i32 = -4;
    pub const RIGHT: i32 = -5;
    pub const UP: i32 = -6;
    pub const DOWN: i32 = -7;

    // View-local actions, handled without an engine content key.
    pub const SYMBOL_VIEW: i32 = -8;
    pub const MENU: i32 = -9;
    pub const UNDO: i32 = -10;
    pub const MODE_KANA: i32 = -11;
    pub const MODE_ALPHABET: i32 = -12;
    pub const NUMBER_PICKER_OPEN: i32 = -13;
    pub const NUMBER_PICKER_CLOSE: i32 = -14;
}
