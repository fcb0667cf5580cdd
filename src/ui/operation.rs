use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Wizard operations that show progress, with their progress bar styles and
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Install,
}

impl Operation {
    pub fn progress_bar_style(&self) -> Result<ProgressStyle> {
        let template = match self {
            Operation::Lookup => "{spinner:.green} {prefix} {msg} [{elapsed_precise}]",
            Operation::Install => {
                "{spinner:.green} {prefix} {msg} [{elapsed_precise}] [{bar:20.cyan/blue}]"
            }
        };

        ProgressStyle::with_template(template)
            .context("Failed to create progress bar style")
            .map(|style| style.progress_chars(self.progress_chars()))
    }

    pub fn action_verb(&self) -> &'static str {
        match self {
            Operation::Lookup => "Looking up",
            Operation::Install => "Installing",
        }
    }

    /// Install bars advance once per install phase.
    pub fn default_progress_bar_length(&self) -> u64 {
        match self {
            Operation::Lookup => 1,
            Operation::Install => 4,
        }
    }

    pub fn progress_chars(&self) -> &'static str {
        "#>-"
    }

    pub fn create_progress_bar(
        &self,
        m: &MultiProgress,
        index: usize,
        total: usize,
        title: &str,
    ) -> Result<ProgressBar> {
        let pb = m.add(ProgressBar::new(self.default_progress_bar_length()));
        pb.set_style(self.progress_bar_style()?);
        pb.set_prefix(format!("[{}/{}]", index + 1, total));
        pb.set_message(format!("{}: {}", self.action_verb(), title));
        Ok(pb)
    }
}
