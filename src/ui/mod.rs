mod navigator;
mod operation;

pub use navigator::{ConsoleNavigator, Navigator};
pub use operation::Operation;

#[cfg(test)]
#[allow(unused)]
pub use navigator::MockNavigator;
#[cfg(test)]
pub use navigator::NavigationState;

use anyhow::{Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub struct OperationManager {
    multi_progress: MultiProgress,
    main_progress: ProgressBar,
    operation: Operation,
}

impl OperationManager {
    pub fn new(operation: Operation) -> Result<Self> {
        let multi_progress = MultiProgress::new();
        let main_progress = multi_progress.add(ProgressBar::no_length());

        main_progress.set_style(
            ProgressStyle::with_template("{msg}")
                .map_err(|e| anyhow!("Failed to create main progress style: {}", e))?,
        );
        main_progress.set_message(Self::get_main_message_by_operation(&operation));

        Ok(Self {
            multi_progress,
            main_progress,
            operation,
        })
    }

    fn get_main_message_by_operation(operation: &Operation) -> String {
        match operation {
            Operation::Lookup => "Looking for plugins".to_string(),
            Operation::Install => "Installing plugins".to_string(),
        }
    }

    pub fn finish(&self) {
        self.main_progress.finish_and_clear();
    }

    pub fn add_progress_bar(&self, index: usize, total: usize, title: &str) -> Result<ProgressBar> {
        self.operation
            .create_progress_bar(&self.multi_progress, index, total, title)
    }
}
