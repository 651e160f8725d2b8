use thiserror::Error;

use crate::sequencer::SequencerError;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Workflow error: {0}")]
    Sequencer(#[from] SequencerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = WizardError::Config("invalid server URL".into());
        assert_eq!(err.to_string(), "Config error: invalid server URL");
    }

    #[test]
    fn sequencer_error_converts() {
        let err = WizardError::from(SequencerError::UnknownStep("ghost".into()));
        assert_eq!(err.to_string(), "Workflow error: unknown step \"ghost\"");
    }
}
