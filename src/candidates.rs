//! Candidate surface arbitration.
//!
//! Exactly one of three surfaces shows candidates at a time: the on-keyboard
//! strip, the number picker, or the floating window used in narrow mode.
//! The controller resolves the target surface from its input flags and emits
//! `SurfaceCommand`s for the view layer to apply; it never calls into the
//! view itself.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateMode {
    Keyboard,
    Number,
    Floating,
}

/// Fold/expand sub-state of the docked surfaces. Floating mode has no fold
/// affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldState {
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    pub candidates: Vec<Candidate>,
    pub focused: Option<usize>,
}

impl CandidateList {
    pub fn empty() -> Self {
        CandidateList::default()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// One-way instruction to the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Push an empty result to a surface without animating.
    Clear { mode: CandidateMode },
    Hide { mode: CandidateMode },
    Show { mode: CandidateMode, list: CandidateList },
    SetFold { state: FoldState },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CandidateModeError {
    /// Fold requests in floating mode are caller bugs, not user input.
    #[error("fold state is not applicable in floating candidate mode")]
    FoldInFloatingMode,
}

#[derive(Debug)]
pub struct CandidateModeController {
    active: CandidateMode,
    fold: FoldState,
    narrow: bool,
    floating_allowed: bool,
    extracted: bool,
    number_picker_open: bool,
    /// Last result shown, replayed into a surface on hand-off.
    last: CandidateList,
}

impl Default for CandidateModeController {
    fn default() -> Self {
        CandidateModeController::new()
    }
}

impl CandidateModeController {
    pub fn new() -> Self {
        CandidateModeController {
            active: CandidateMode::Keyboard,
            fold: FoldState::Collapsed,
            narrow: false,
            floating_allowed: false,
            extracted: false,
            number_picker_open: false,
            last: CandidateList::empty(),
        }
    }

    pub fn active(&self) -> CandidateMode {
        self.active
    }

    pub fn fold(&self) -> FoldState {
        self.fold
    }

    /// While a docked surface is expanded, vertical keys page the list in
    /// the view layer instead of editing the composition.
    pub fn pages_with_vertical_keys(&self) -> bool {
        self.active != CandidateMode::Floating && self.fold == FoldState::Expanded
    }

    fn target(&self) -> CandidateMode {
        if self.narrow && self.floating_allowed && !self.extracted {
            CandidateMode::Floating
        } else if self.number_picker_open {
            CandidateMode::Number
        } else {
            CandidateMode::Keyboard
        }
    }

    pub fn set_narrow(&mut self, narrow: bool) -> Vec<SurfaceCommand> {
        self.narrow = narrow;
        self.refresh()
    }

    pub fn set_floating_allowed(&mut self, allowed: bool) -> Vec<SurfaceCommand> {
        self.floating_allowed = allowed;
        self.refresh()
    }

    pub fn set_extracted(&mut self, extracted: bool) -> Vec<SurfaceCommand> {
        self.extracted = extracted;
        self.refresh()
    }

    pub fn open_number_picker(&mut self) -> Vec<SurfaceCommand> {
        self.number_picker_open = true;
        self.refresh()
    }

    pub fn close_number_picker(&mut self) -> Vec<SurfaceCommand> {
        self.number_picker_open = false;
        self.refresh()
    }

    /// Recompute the target surface; on a change, clear and hide the old
    /// surface first, then replay the last result into the new one.
    fn refresh(&mut self) -> Vec<SurfaceCommand> {
        let target = self.target();
        if target == self.active {
            return Vec::new();
        }
        debug!(from = ?self.active, to = ?target, "candidate surface hand-off");
        let previous = self.active;
        self.active = target;
        vec![
            SurfaceCommand::Clear { mode: previous },
            SurfaceCommand::Hide { mode: previous },
            SurfaceCommand::Show {
                mode: target,
                list: self.last.clone(),
            },
        ]
    }

    /// Feed a new result into the active surface, driving the fold/expand
    /// sub-state on empty/non-empty edges. Repeated edges into the current
    /// sub-state are no-ops so animations never restart.
    pub fn update_candidates(&mut self, list: CandidateList) -> Vec<SurfaceCommand> {
        let had = !self.last.is_empty();
        let has = !list.is_empty();
        self.last = list;

        let mut commands = vec![SurfaceCommand::Show {
            mode: self.active,
            list: self.last.clone(),
        }];

        if self.active != CandidateMode::Floating {
            if !had && has && self.fold != FoldState::Expanded {
                self.fold = FoldState::Expanded;
                commands.push(SurfaceCommand::SetFold {
                    state: FoldState::Expanded,
                });
            } else if had && !has && self.fold != FoldState::Collapsed {
                self.fold = FoldState::Collapsed;
                commands.push(SurfaceCommand::SetFold {
                    state: FoldState::Collapsed,
                });
            }
        }
        commands
    }

    /// Explicit fold/expand request from the view chrome. Only the docked
    /// surfaces have a fold affordance.
    pub fn set_fold(&mut self, state: FoldState) -> Result<Option<SurfaceCommand>, CandidateModeError> {
        if self.active == CandidateMode::Floating {
            return Err(CandidateModeError::FoldInFloatingMode);
        }
        if self.fold == state {
            return Ok(None);
        }
        self.fold = state;
        Ok(Some(SurfaceCommand::SetFold { state }))
    }
}
