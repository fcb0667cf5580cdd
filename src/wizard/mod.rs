mod coordinator;
mod error;
mod license_flow;
mod stage;

pub use coordinator::{InstallerWizard, LicenseStep};
pub use error::WizardError;
pub use license_flow::LicenseFlow;
pub use stage::Stage;
