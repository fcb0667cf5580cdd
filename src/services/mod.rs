mod catalog;
mod install;
mod lookup;
mod package;

pub use catalog::CatalogLookupService;
pub use install::{InstallService, PackageInstallService};
pub use lookup::{HttpLookupService, LookupService};
pub use package::{DefaultPackageService, PackageService};

#[cfg(test)]
pub use install::MockInstallService;
#[cfg(test)]
pub use lookup::MockLookupService;
#[cfg(test)]
pub use package::MockPackageService;
