use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbolic result produced by running a wizard step.
///
/// The sequencer treats outcomes as opaque routing tokens; which of them
/// mean "success" or "failure" is entirely a property of the transition
/// table. `Back` is the one exception: it pops the visit history instead of
/// being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Next,
    Back,
    Abort,
    Cancel,
    Skip,
    Auto,
    Register,
    Extensions,
    Update,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Next => write!(f, "next"),
            Outcome::Back => write!(f, "back"),
            Outcome::Abort => write!(f, "abort"),
            Outcome::Cancel => write!(f, "cancel"),
            Outcome::Skip => write!(f, "skip"),
            Outcome::Auto => write!(f, "auto"),
            Outcome::Register => write!(f, "register"),
            Outcome::Extensions => write!(f, "extensions"),
            Outcome::Update => write!(f, "update"),
        }
    }
}

/// Token ending a whole sequence, returned to the caller of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalResult {
    Next,
    Abort,
    Auto,
}

impl fmt::Display for TerminalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalResult::Next => write!(f, "next"),
            TerminalResult::Abort => write!(f, "abort"),
            TerminalResult::Auto => write!(f, "auto"),
        }
    }
}

/// Where a transition leads: either another step or the end of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Step(String),
    Terminal(TerminalResult),
}

/// A broken workflow definition. These indicate a bug in the table or in
/// the step set, not a runtime condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    #[error("unknown step \"{0}\"")]
    UnknownStep(String),

    #[error("step \"{step}\" has no transition for outcome \"{outcome}\"")]
    UnmappedOutcome { step: String, outcome: Outcome },

    #[error("step \"{step}\" routes outcome \"{outcome}\" to undefined step \"{target}\"")]
    DanglingTarget {
        step: String,
        outcome: Outcome,
        target: String,
    },
}

/// The wiring of a wizard: step id → (outcome → next step or terminal).
///
/// Immutable for the duration of one run. Serializes to a plain
/// mapping-of-mappings, so a table can be stored or shipped and rebuilt
/// into an equivalent sequencer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<Outcome, Target>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one transition. Inserting for a new step id also defines the step.
    pub fn insert(&mut self, step: &str, outcome: Outcome, target: Target) {
        self.rules
            .entry(step.to_string())
            .or_default()
            .insert(outcome, target);
    }

    /// Whether the table defines any transitions for the given step.
    pub fn defines(&self, step: &str) -> bool {
        self.rules.contains_key(step)
    }

    /// Resolve a (step, outcome) pair to its target.
    pub fn lookup(&self, step: &str, outcome: Outcome) -> Result<&Target, SequencerError> {
        let rules = self
            .rules
            .get(step)
            .ok_or_else(|| SequencerError::UnknownStep(step.to_string()))?;
        rules
            .get(&outcome)
            .ok_or_else(|| SequencerError::UnmappedOutcome {
                step: step.to_string(),
                outcome,
            })
    }

    /// Check that every step target names a step defined in this table.
    pub fn validate(&self) -> Result<(), SequencerError> {
        for (step, rules) in &self.rules {
            for (outcome, target) in rules {
                if let Target::Step(next) = target
                    && !self.rules.contains_key(next)
                {
                    return Err(SequencerError::DanglingTarget {
                        step: step.clone(),
                        outcome: *outcome,
                        target: next.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
