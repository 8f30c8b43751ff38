use thiserror::Error;

/// Errors raised while assembling or submitting a device
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("A device submission is already in flight")]
    SubmitInFlight,

    #[error("Device creation failed: {0}")]
    Creation(String),
}

impl From<String> for WizardError {
    fn from(error: String) -> Self {
        WizardError::Creation(error)
    }
}

impl From<&str> for WizardError {
    fn from(error: &str) -> Self {
        WizardError::Creation(error.to_string())
    }
}

/// Type alias for Results using WizardError
pub type Result<T> = std::result::Result<T, WizardError>;
