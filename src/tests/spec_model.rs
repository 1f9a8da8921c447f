use crate::keyevent::KeyOrigin;
use crate::spec::{CompositionMode, KeyboardSpecification, SpecModel};

#[test]
fn modes_mirror_after_software_update() {
    let mut model = SpecModel::new();
    model.set_from_software(KeyboardSpecification::software(CompositionMode::HalfAscii));
    assert_eq!(model.software().mode, CompositionMode::HalfAscii);
    assert_eq!(model.hardware().mode, CompositionMode::HalfAscii);
    // The hardware intent keeps its own identity, only the mode mirrors.
    assert_eq!(model.hardware().origin, KeyOrigin::Hardware);
}

#[test]
fn modes_mirror_after_hardware_update() {
    let mut model = SpecModel::new();
    model.set_from_hardware(KeyboardSpecification::hardware(CompositionMode::FullKatakana));
    assert_eq!(model.software().mode, CompositionMode::FullKatakana);
    assert_eq!(model.hardware().mode, CompositionMode::FullKatakana);
    assert_eq!(model.software().origin, KeyOrigin::Software);
}

#[test]
fn resolve_active_follows_narrow_mode() {
    let model = SpecModel::new();
    assert_eq!(model.resolve_active(false).origin, KeyOrigin::Software);
    assert_eq!(model.resolve_active(true).origin, KeyOrigin::Hardware);
}

#[test]
fn push_if_changed_is_idempotent() {
    let mut model = SpecModel::new();
    let spec = model.software();

    assert_eq!(model.push_if_changed(spec), Some(spec));
    // Identical pushes must not reach the engine again.
    assert_eq!(model.push_if_changed(spec), None);
    assert_eq!(model.push_if_changed(spec), None);
    assert_eq!(model.active(), Some(spec));

    let hardware = model.hardware();
    assert_eq!(model.push_if_changed(hardware), Some(hardware));
    assert_eq!(model.active(), Some(hardware));
}

#[test]
fn fallback_is_a_software_kana_spec() {
    let fallback = KeyboardSpecification::fallback();
    assert_eq!(fallback.origin, KeyOrigin::Software);
    assert_eq!(fallback.mode, CompositionMode::Hiragana);
}
