//! Hardware scan-code keymap loaded from TOML.
//!
//! - `init_custom(toml_content)` installs a custom table before first use
//! - `HardwareKeymap::global()` returns the lazy-init singleton
//! - The default table is embedded via `include_str!("default_keymap.toml")`
//!
//! Lookup key is `(scan_code, modifier_mask)` where the mask packs
//! (shift, alt, ctrl) into 3 bits. Unmapped pairs are simply absent; the
//! router leaves such events unconsumed.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::keyevent::NamedKey;

pub const DEFAULT_KEYMAP_TOML: &str = include_str!("default_keymap.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();
static INSTANCE: OnceLock<HardwareKeymap> = OnceLock::new();

/// Set a custom keymap TOML. Must run before the first
/// `HardwareKeymap::global()` call; once the global table exists the
/// override can no longer take effect and this fails with
/// `AlreadyInitialized` instead of succeeding silently.
pub fn init_custom(toml_content: String) -> Result<(), KeymapError> {
    HardwareKeymap::parse(&toml_content)?;
    if INSTANCE.get().is_some() {
        return Err(KeymapError::AlreadyInitialized);
    }
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| KeymapError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("entry for scan {scan} mask {mask}: {reason}")]
    InvalidEntry { scan: u32, mask: u8, reason: String },
    #[error("duplicate entry for scan {scan} mask {mask}")]
    Duplicate { scan: u32, mask: u8 },
    #[error("keymap already initialized")]
    AlreadyInitialized,
}

/// What a mapped `(scan, mask)` pair resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapEntry {
    Named(NamedKey),
    Literal(char),
    /// The kana/alphabet toggle key: flips composition mode, carries no
    /// content key.
    ModeToggle,
}

#[derive(Debug, Deserialize)]
struct KeymapFile {
    #[serde(default)]
    key: Vec<KeyDef>,
}

#[derive(Debug, Deserialize)]
struct KeyDef {
    scan: u32,
    #[serde(default)]
    mask: u8,
    name: Option<String>,
    #[serde(rename = "char")]
    ch: Option<String>,
    #[serde(default)]
    toggle: bool,
}

pub struct HardwareKeymap {
    entries: HashMap<(u32, u8), KeymapEntry>,
}

impl HardwareKeymap {
    /// Get or initialize the global keymap singleton.
    pub fn global() -> &'static HardwareKeymap {
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_KEYMAP_TOML);
            match HardwareKeymap::parse(toml_str) {
                Ok(map) => map,
                Err(err) => {
                    // A broken custom table must not disable typing.
                    tracing::warn!(%err, "custom keymap rejected, using default");
                    HardwareKeymap::parse(DEFAULT_KEYMAP_TOML)
                        .unwrap_or_else(|_| HardwareKeymap {
                            entries: HashMap::new(),
                        })
                }
            }
        })
    }

    pub fn parse(toml_str: &str) -> Result<HardwareKeymap, KeymapError> {
        let file: KeymapFile =
            toml::from_str(toml_str).map_err(|e| KeymapError::Parse(e.to_string()))?;

        let mut entries = HashMap::with_capacity(file.key.len());
        for def in &file.key {
            let entry = parse_entry(def)?;
            if entries.insert((def.scan, def.mask), entry).is_some() {
                return Err(KeymapError::Duplicate {
                    scan: def.scan,
                    mask: def.mask,
                });
            }
        }
        Ok(HardwareKeymap { entries })
    }

    pub fn get(&self, scan_code: u32, mask: u8) -> Option<KeymapEntry> {
        self.entries.get(&(scan_code, mask)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(def: &KeyDef) -> Result<KeymapEntry, KeymapError> {
    let invalid = |reason: &str| KeymapError::InvalidEntry {
        scan: def.scan,
        mask: def.mask,
        reason: reason.to_string(),
    };

    if def.mask > 7 {
        return Err(invalid("mask must fit in 3 bits"));
    }

    let fields = def.name.is_some() as u8 + def.ch.is_some() as u8 + def.toggle as u8;
    if fields != 1 {
        return Err(invalid("exactly one of name/char/toggle required"));
    }

    if def.toggle {
        return Ok(KeymapEntry::ModeToggle);
    }
    if let Some(name) = &def.name {
        let key = parse_named(name).ok_or_else(|| invalid("unknown key name"))?;
        return Ok(KeymapEntry::Named(key));
    }
    let ch = def.ch.as_deref().unwrap_or_default();
    let mut chars = ch.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(KeymapEntry::Literal(c)),
        _ => Err(invalid("char must be exactly one codepoint")),
    }
}

fn parse_named(name: &str) -> Option<NamedKey> {
    let key = match name {
        "space" => NamedKey::Space,
        "enter" => NamedKey::Enter,
        "backspace" => NamedKey::Backspace,
        "delete" => NamedKey::Delete,
        "escape" => NamedKey::Escape,
        "tab" => NamedKey::Tab,
        "left" => NamedKey::Left,
        "right" => NamedKey::Right,
        "up" => NamedKey::Up,
        "down" => NamedKey::Down,
        "home" => NamedKey::Home,
        "end" => NamedKey::End,
        "pageup" => NamedKey::PageUp,
        "pagedown" => NamedKey::PageDown,
        "numpadenter" => NamedKey::NumpadEnter,
        _ => {
            let n = name.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=12).contains(&n) {
                NamedKey::Function(n)
            } else {
                return None;
            }
        }
    };
    Some(key)
}
