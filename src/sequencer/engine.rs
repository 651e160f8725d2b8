use super::table::{Outcome, SequencerError, Target, TerminalResult, TransitionTable};

/// Supplies the executable side of a wizard: the action behind each step
/// name, plus the per-step flag deciding whether a step is re-run when the
/// user navigates back into it.
///
/// Actions may have arbitrary externally visible effects (network calls,
/// dialogs); the sequencer only consumes the outcome they return. A step
/// name the runner does not recognize is a configuration error.
pub trait StepRunner {
    async fn run_step(&mut self, step: &str) -> Result<Outcome, SequencerError>;

    /// When `true`, re-entering this step via `back` skips execution and
    /// reuses the outcome recorded on the earlier visit.
    fn skip_on_back(&self, _step: &str) -> bool {
        false
    }
}

/// One executed step together with the outcome it produced.
#[derive(Debug, Clone)]
struct Visit {
    step: String,
    outcome: Outcome,
}

/// Table-driven wizard sequencer: executes named steps until the table
/// resolves an outcome to a terminal result.
#[derive(Debug)]
pub struct Sequencer {
    table: TransitionTable,
}

impl Sequencer {
    /// Build a sequencer, failing fast if the table routes to a step it
    /// never defines.
    pub fn new(table: TransitionTable) -> Result<Self, SequencerError> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Run from `start` until a terminal result is reached.
    ///
    /// `back` pops the visit history and re-enters the previous step; with
    /// an empty history it falls through to a normal table lookup, so a
    /// table may still map it explicitly for its head step.
    pub async fn run(
        &self,
        runner: &mut impl StepRunner,
        start: &str,
    ) -> Result<TerminalResult, SequencerError> {
        if !self.table.defines(start) {
            return Err(SequencerError::UnknownStep(start.to_string()));
        }

        let mut current = start.to_string();
        let mut history: Vec<Visit> = Vec::new();
        // Holds the recorded outcome when `current` was reached by going back.
        let mut recorded: Option<Outcome> = None;

        loop {
            let outcome = match recorded.take() {
                Some(previous) if runner.skip_on_back(&current) => previous,
                _ => runner.run_step(&current).await?,
            };

            if outcome == Outcome::Back
                && let Some(visit) = history.pop()
            {
                current = visit.step;
                recorded = Some(visit.outcome);
                continue;
            }

            match self.table.lookup(&current, outcome)? {
                Target::Terminal(result) => return Ok(*result),
                Target::Step(next) => {
                    let next = next.clone();
                    history.push(Visit {
                        step: current,
                        outcome,
                    });
                    current = next;
                }
            }
        }
    }
}
