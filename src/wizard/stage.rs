use std::fmt;

/// Steps of the installer wizard, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CollectingRequests,
    LookingUp,
    SelectingPlugins,
    AcceptingLicenses,
    /// License flow finished or skipped, install not started yet.
    ReadyToInstall,
    Installing,
    ShowingResults,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::ShowingResults)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CollectingRequests => "collecting requests",
            Stage::LookingUp => "looking up plugins",
            Stage::SelectingPlugins => "selecting plugins",
            Stage::AcceptingLicenses => "accepting licenses",
            Stage::ReadyToInstall => "ready to install",
            Stage::Installing => "installing",
            Stage::ShowingResults => "showing results",
        };
        f.write_str(name)
    }
}
