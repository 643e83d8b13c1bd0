//! Guided tutorial: a fixed walk through the device verbs.
//!
//! Each step prints a description and the command it will run, then waits for
//! the user. `exit`/`quit` (any case) or closed input ends the tutorial; any
//! other line, empty included, runs the step's command and moves on.

use tracing::debug;

use crate::shell::{is_exit_word, CommandShell};

const RULE: &str = "========================================";

/// One tutorial step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TutorialStep {
    /// 1-based position in the sequence.
    pub number: usize,
    /// What the step demonstrates.
    pub description: &'static str,
    /// Verb and arguments, without the module name.
    pub command: &'static str,
}

impl TutorialStep {
    /// Full command line for `module`.
    #[must_use]
    pub fn command_line(&self, module: &str) -> String {
        format!("{module} {}", self.command)
    }
}

/// Steps replayed verbatim on every run.
pub const TUTORIAL_STEPS: [TutorialStep; 5] = [
    TutorialStep {
        number: 1,
        description: "Check device status",
        command: "status",
    },
    TutorialStep {
        number: 2,
        description: "Enable the device",
        command: "enable",
    },
    TutorialStep {
        number: 3,
        description: "Write data to device",
        command: "write 0x1234",
    },
    TutorialStep {
        number: 4,
        description: "Read data from device",
        command: "read",
    },
    TutorialStep {
        number: 5,
        description: "Disable the device",
        command: "disable",
    },
];

/// Tutorial state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TutorialState {
    /// Prompt for the given 1-based step is outstanding.
    AwaitingConfirmation(usize),
    /// The user left early.
    Exit,
    /// Every step ran.
    Done,
}

impl TutorialState {
    /// Returns `true` for `Exit` and `Done`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exit | Self::Done)
    }
}

/// Effect of feeding one input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
    /// Run this step's command, then pace.
    Proceed(TutorialStep),
    /// The tutorial ended at the user's request.
    Exit,
    /// The runner was already terminal; the input was ignored.
    Ignored,
}

/// Drives [`TUTORIAL_STEPS`] through a [`CommandShell`].
#[derive(Debug, Clone)]
pub struct TutorialRunner {
    steps: &'static [TutorialStep],
    state: TutorialState,
}

impl Default for TutorialRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorialRunner {
    /// Creates a runner over the standard steps.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_steps(&TUTORIAL_STEPS)
    }

    /// Creates a runner over a custom step list.
    #[must_use]
    pub const fn with_steps(steps: &'static [TutorialStep]) -> Self {
        let state = if steps.is_empty() {
            TutorialState::Done
        } else {
            TutorialState::AwaitingConfirmation(1)
        };
        Self { steps, state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TutorialState {
        self.state
    }

    /// Step whose prompt is outstanding, if any.
    #[must_use]
    pub fn current_step(&self) -> Option<&TutorialStep> {
        match self.state {
            TutorialState::AwaitingConfirmation(number) => self.steps.get(number - 1),
            TutorialState::Exit | TutorialState::Done => None,
        }
    }

    /// Applies one user response. `None` means input closed.
    pub fn advance(&mut self, input: Option<&str>) -> StepAction {
        let TutorialState::AwaitingConfirmation(number) = self.state else {
            return StepAction::Ignored;
        };
        let Some(step) = self.steps.get(number - 1).copied() else {
            self.state = TutorialState::Done;
            return StepAction::Ignored;
        };

        match input.map(str::trim) {
            None => {
                self.state = TutorialState::Exit;
                StepAction::Exit
            }
            Some(text) if is_exit_word(text) => {
                self.state = TutorialState::Exit;
                StepAction::Exit
            }
            Some(_) => {
                self.state = if number >= self.steps.len() {
                    TutorialState::Done
                } else {
                    TutorialState::AwaitingConfirmation(number + 1)
                };
                StepAction::Proceed(step)
            }
        }
    }

    /// Runs the tutorial to a terminal state and returns it.
    pub fn run(&mut self, shell: &mut CommandShell<'_>) -> TutorialState {
        let module = shell.options().module.clone();
        let title = shell.options().title.clone();

        shell.print("");
        shell.print(RULE);
        shell.print(&format!("   {title} Interactive Tutorial"));
        shell.print(RULE);
        shell.print("");
        shell.print(&format!("This tutorial will guide you through using the {title} library."));
        shell.print("Type 'exit' at any prompt to quit the tutorial.");
        shell.print("");
        pace(shell);

        if !shell.has_device() {
            shell.print("Note: Device not initialized. Tutorial will show commands anyway.");
            shell.print("In a real application, you would initialize the device first:");
            shell.print("");
            shell.print("  let mut device = RegisterDriver::with_default_base(bus, clock);");
            shell.print("  device.initialize();");
            shell.print("");
            pace(shell);
        }

        while let Some(step) = self.current_step().copied() {
            let line = step.command_line(&module);
            shell.print("");
            shell.print(&format!("Step {}: {}", step.number, step.description));
            shell.print(&format!("Try the command: {line}"));
            shell.print("");
            shell.channel().write("Press Enter when ready (or type 'exit' to quit): ");

            let input = shell.wait_for_line();
            shell.print("");

            match self.advance(input.as_deref()) {
                StepAction::Proceed(step) => {
                    debug!(step = step.number, "tutorial step");
                    shell.print(&format!("> {line}"));
                    shell.execute_line(&line);
                    pace(shell);
                }
                StepAction::Exit => {
                    shell.print("Tutorial exited.");
                }
                StepAction::Ignored => {}
            }
        }

        if self.state == TutorialState::Done {
            shell.print("");
            shell.print(RULE);
            shell.print("   Tutorial Complete!");
            shell.print(RULE);
            shell.print("");
            shell.print(&format!("You've learned the basic commands for {title}."));
            shell.print(&format!("For more information, see the README.md or run: {module} help"));
            shell.print("");
        }

        self.state
    }
}

fn pace(shell: &CommandShell<'_>) {
    shell.clock().sleep(shell.options().tutorial_pacing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_step() {
        let runner = TutorialRunner::new();
        assert_eq!(runner.state(), TutorialState::AwaitingConfirmation(1));
        assert_eq!(runner.current_step().unwrap().command, "status");
    }

    #[test]
    fn any_non_exit_input_proceeds() {
        let mut runner = TutorialRunner::new();
        assert_eq!(
            runner.advance(Some("")),
            StepAction::Proceed(TUTORIAL_STEPS[0])
        );
        assert_eq!(
            runner.advance(Some("  yes please ")),
            StepAction::Proceed(TUTORIAL_STEPS[1])
        );
        assert_eq!(runner.state(), TutorialState::AwaitingConfirmation(3));
    }

    #[test]
    fn exit_and_quit_are_case_insensitive() {
        for word in ["exit", "EXIT", "Quit", " quit "] {
            let mut runner = TutorialRunner::new();
            assert_eq!(runner.advance(Some(word)), StepAction::Exit);
            assert_eq!(runner.state(), TutorialState::Exit);
            assert_eq!(runner.advance(Some("")), StepAction::Ignored);
        }
    }

    #[test]
    fn closed_input_exits() {
        let mut runner = TutorialRunner::new();
        runner.advance(Some(""));
        assert_eq!(runner.advance(None), StepAction::Exit);
        assert!(runner.state().is_terminal());
    }

    #[test]
    fn last_step_transitions_to_done() {
        let mut runner = TutorialRunner::new();
        for step in TUTORIAL_STEPS {
            assert_eq!(runner.advance(Some("")), StepAction::Proceed(step));
        }
        assert_eq!(runner.state(), TutorialState::Done);
        assert_eq!(runner.current_step(), None);
    }

    #[test]
    fn empty_step_list_is_done_immediately() {
        let runner = TutorialRunner::with_steps(&[]);
        assert_eq!(runner.state(), TutorialState::Done);
    }

    #[test]
    fn command_line_prefixes_module() {
        assert_eq!(TUTORIAL_STEPS[2].command_line("template"), "template write 0x1234");
    }
}
