mod engine;
mod table;

pub use engine::{Sequencer, StepRunner};
pub use table::{Outcome, SequencerError, Target, TerminalResult, TransitionTable};
