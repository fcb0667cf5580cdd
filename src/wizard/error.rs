use crate::wizard::Stage;

/// Misuse of the wizard by the navigation shell or a collaborator.
///
/// Lookup and install failures are not errors here; they are stored on the
/// owning record and reported in the summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {operation} while the wizard is {actual}")]
    InvalidStage {
        operation: &'static str,
        actual: Stage,
    },
    #[error("unknown plugin id '{0}'")]
    UnknownPlugin(String),
    #[error("no plugin was requested for mime type '{0}'")]
    UnknownRequest(String),
    #[error("the license for '{0}' has not finished loading")]
    LicenseNotLoaded(String),
    #[error("the plugin wizard was cancelled")]
    Cancelled,
}
