use crate::candidates::{
    Candidate, CandidateList, CandidateMode, CandidateModeController, CandidateModeError,
    FoldState, SurfaceCommand,
};

fn list(words: &[&str]) -> CandidateList {
    CandidateList {
        candidates: words
            .iter()
            .map(|w| Candidate {
                text: w.to_string(),
                description: None,
            })
            .collect(),
        focused: if words.is_empty() { None } else { Some(0) },
    }
}

#[test]
fn keyboard_is_the_default_surface() {
    let controller = CandidateModeController::new();
    assert_eq!(controller.active(), CandidateMode::Keyboard);
    assert_eq!(controller.fold(), FoldState::Collapsed);
}

#[test]
fn scenario_floating_eligibility() {
    let mut controller = CandidateModeController::new();
    controller.set_floating_allowed(true);
    let commands = controller.set_narrow(true);

    // narrow ∧ floating-allowed ∧ ¬extracted → floating.
    assert_eq!(controller.active(), CandidateMode::Floating);
    assert_eq!(
        commands,
        vec![
            SurfaceCommand::Clear {
                mode: CandidateMode::Keyboard
            },
            SurfaceCommand::Hide {
                mode: CandidateMode::Keyboard
            },
            SurfaceCommand::Show {
                mode: CandidateMode::Floating,
                list: CandidateList::empty(),
            },
        ]
    );

    // Flipping extracted forces keyboard and clears floating first.
    let commands = controller.set_extracted(true);
    assert_eq!(controller.active(), CandidateMode::Keyboard);
    assert_eq!(
        commands[0],
        SurfaceCommand::Clear {
            mode: CandidateMode::Floating
        }
    );
    assert_eq!(
        commands[1],
        SurfaceCommand::Hide {
            mode: CandidateMode::Floating
        }
    );
}

#[test]
fn number_picker_wins_only_outside_floating() {
    let mut controller = CandidateModeController::new();
    controller.open_number_picker();
    assert_eq!(controller.active(), CandidateMode::Number);

    // Floating outranks the picker.
    controller.set_floating_allowed(true);
    controller.set_narrow(true);
    assert_eq!(controller.active(), CandidateMode::Floating);

    // Leaving narrow mode falls back to the still-open picker.
    controller.set_narrow(false);
    assert_eq!(controller.active(), CandidateMode::Number);

    controller.close_number_picker();
    assert_eq!(controller.active(), CandidateMode::Keyboard);
}

#[test]
fn unchanged_target_emits_no_commands() {
    let mut controller = CandidateModeController::new();
    assert!(controller.set_narrow(false).is_empty());
    assert!(controller.set_floating_allowed(true).is_empty());
    assert!(controller.set_extracted(true).is_empty());
}

#[test]
fn hand_off_replays_last_result() {
    let mut controller = CandidateModeController::new();
    controller.update_candidates(list(&["今日", "京"]));

    controller.set_floating_allowed(true);
    let commands = controller.set_narrow(true);
    assert_eq!(
        commands[2],
        SurfaceCommand::Show {
            mode: CandidateMode::Floating,
            list: list(&["今日", "京"]),
        }
    );
}

#[test]
fn fold_expands_on_first_candidates_and_collapses_on_empty() {
    let mut controller = CandidateModeController::new();

    let commands = controller.update_candidates(list(&["今日"]));
    assert_eq!(controller.fold(), FoldState::Expanded);
    assert!(commands.contains(&SurfaceCommand::SetFold {
        state: FoldState::Expanded
    }));

    // Non-empty to non-empty: no fold edge, no restart.
    let commands = controller.update_candidates(list(&["京", "強"]));
    assert!(!commands.iter().any(|c| matches!(c, SurfaceCommand::SetFold { .. })));

    let commands = controller.update_candidates(list(&[]));
    assert_eq!(controller.fold(), FoldState::Collapsed);
    assert!(commands.contains(&SurfaceCommand::SetFold {
        state: FoldState::Collapsed
    }));

    // Empty to empty: still collapsed, no command.
    let commands = controller.update_candidates(list(&[]));
    assert!(!commands.iter().any(|c| matches!(c, SurfaceCommand::SetFold { .. })));
}

#[test]
fn explicit_fold_request_is_guarded() {
    let mut controller = CandidateModeController::new();

    // Already collapsed: no-op.
    assert_eq!(controller.set_fold(FoldState::Collapsed), Ok(None));

    assert_eq!(
        controller.set_fold(FoldState::Expanded),
        Ok(Some(SurfaceCommand::SetFold {
            state: FoldState::Expanded
        }))
    );
    assert_eq!(controller.fold(), FoldState::Expanded);
}

#[test]
fn fold_request_in_floating_mode_is_an_error() {
    let mut controller = CandidateModeController::new();
    controller.set_floating_allowed(true);
    controller.set_narrow(true);
    assert_eq!(controller.active(), CandidateMode::Floating);

    assert_eq!(
        controller.set_fold(FoldState::Expanded),
        Err(CandidateModeError::FoldInFloatingMode)
    );
}

#[test]
fn floating_mode_has_no_automatic_fold_edges() {
    let mut controller = CandidateModeController::new();
    controller.set_floating_allowed(true);
    controller.set_narrow(true);

    let commands = controller.update_candidates(list(&["今日"]));
    assert!(!commands.iter().any(|c| matches!(c, SurfaceCommand::SetFold { .. })));
    assert_eq!(controller.fold(), FoldState::Collapsed);
}
