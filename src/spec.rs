//! Keyboard specifications and the model tracking which one is active.
//!
//! The software and hardware input paths each hold an "intended"
//! specification; updating either mirrors its composition mode into the
//! other so the two never diverge. `push_if_changed` is the single gate for
//! engine-side spec updates and is idempotent by comparison with the last
//! spec actually pushed.

use crate::keyevent::KeyOrigin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    Hiragana,
    FullKatakana,
    HalfKatakana,
    FullAscii,
    HalfAscii,
}

/// Selector for the engine-side special mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTable {
    Default,
    TwelveKeyFlick,
    Godan,
    QwertyMobile,
    HardwareQwerty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceOnAlphanumeric {
    Commit,
    SpaceOrConvert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingEdgeBehavior {
    DoNothing,
    CommitWithoutConsuming,
}

/// Named configuration the engine applies while interpreting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardSpecification {
    pub name: &'static str,
    pub origin: KeyOrigin,
    pub mode: CompositionMode,
    pub mapping_table: MappingTable,
    pub space_on_alphanumeric: SpaceOnAlphanumeric,
    pub kana_modifier_insensitive: bool,
    pub crossing_edge: CrossingEdgeBehavior,
}

impl KeyboardSpecification {
    /// Software keyboard preset for a composition mode.
    pub fn software(mode: CompositionMode) -> Self {
        let (name, mapping_table) = match mode {
            CompositionMode::Hiragana => ("software-kana", MappingTable::TwelveKeyFlick),
            CompositionMode::FullKatakana => ("software-katakana", MappingTable::TwelveKeyFlick),
            CompositionMode::HalfKatakana => {
                ("software-half-katakana", MappingTable::TwelveKeyFlick)
            }
            CompositionMode::FullAscii => ("software-full-ascii", MappingTable::QwertyMobile),
            CompositionMode::HalfAscii => ("software-ascii", MappingTable::QwertyMobile),
        };
        KeyboardSpecification {
            name,
            origin: KeyOrigin::Software,
            mode,
            mapping_table,
            space_on_alphanumeric: SpaceOnAlphanumeric::SpaceOrConvert,
            kana_modifier_insensitive: true,
            crossing_edge: CrossingEdgeBehavior::DoNothing,
        }
    }

    /// Hardware keyboard preset for a composition mode.
    pub fn hardware(mode: CompositionMode) -> Self {
        let name = match mode {
            CompositionMode::Hiragana => "hardware-kana",
            CompositionMode::FullKatakana => "hardware-katakana",
            CompositionMode::HalfKatakana => "hardware-half-katakana",
            CompositionMode::FullAscii => "hardware-full-ascii",
            CompositionMode::HalfAscii => "hardware-ascii",
        };
        KeyboardSpecification {
            name,
            origin: KeyOrigin::Hardware,
            mode,
            mapping_table: MappingTable::HardwareQwerty,
            space_on_alphanumeric: SpaceOnAlphanumeric::Commit,
            kana_modifier_insensitive: false,
            crossing_edge: CrossingEdgeBehavior::CommitWithoutConsuming,
        }
    }

    /// Fallback used when routing meets a combination it cannot express.
    pub fn fallback() -> Self {
        KeyboardSpecification::software(CompositionMode::Hiragana)
    }
}

/// Tracks the software and hardware intended specifications plus the last
/// specification actually pushed to the engine.
#[derive(Debug, Clone)]
pub struct SpecModel {
    software: KeyboardSpecification,
    hardware: KeyboardSpecification,
    last_pushed: Option<KeyboardSpecification>,
}

impl Default for SpecModel {
    fn default() -> Self {
        SpecModel::new()
    }
}

impl SpecModel {
    pub fn new() -> Self {
        SpecModel {
            software: KeyboardSpecification::software(CompositionMode::Hiragana),
            hardware: KeyboardSpecification::hardware(CompositionMode::Hiragana),
            last_pushed: None,
        }
    }

    pub fn software(&self) -> KeyboardSpecification {
        self.software
    }

    pub fn hardware(&self) -> KeyboardSpecification {
        self.hardware
    }

    /// Replace the software intent, mirroring its composition mode into the
    /// hardware intent.
    pub fn set_from_software(&mut self, spec: KeyboardSpecification) {
        self.software = spec;
        self.hardware = KeyboardSpecification {
            mode: spec.mode,
            ..self.hardware
        };
    }

    /// Replace the hardware intent, mirroring its composition mode into the
    /// software intent.
    pub fn set_from_hardware(&mut self, spec: KeyboardSpecification) {
        self.hardware = spec;
        self.software = KeyboardSpecification {
            mode: spec.mode,
            ..self.software
        };
    }

    /// The spec that should drive the engine right now. Narrow mode means a
    /// hardware keyboard is the primary input path.
    pub fn resolve_active(&self, currently_narrow: bool) -> KeyboardSpecification {
        if currently_narrow {
            self.hardware
        } else {
            self.software
        }
    }

    /// Intent for a given event origin, used by the router.
    pub fn for_origin(&self, origin: KeyOrigin) -> KeyboardSpecification {
        match origin {
            KeyOrigin::Hardware => self.hardware,
            KeyOrigin::Software => self.software,
        }
    }

    /// Last spec pushed to the engine, if any.
    pub fn active(&self) -> Option<KeyboardSpecification> {
        self.last_pushed
    }

    /// Record `spec` as pushed and return it, or `None` if it equals the last
    /// pushed spec. Repeated identical pushes must never reach the engine, so
    /// engine-side history and personalization stay untouched.
    pub fn push_if_changed(
        &mut self,
        spec: KeyboardSpecification,
    ) -> Option<KeyboardSpecification> {
        if self.last_pushed == Some(spec) {
            return None;
        }
        self.last_pushed = Some(spec);
        Some(spec)
    }
}
