use std::fmt::Display;

use console::{StyledObject, style};

use crate::types::{QualityTier, VerificationStatus};

/// Styled status lines on stdout/stderr
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress everything except errors
    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    pub fn key_value(&self, key: &str, value: impl Display) {
        if !self.quiet {
            println!("  {:<14} {}", style(key).dim(), value);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

pub fn styled_tier(tier: QualityTier) -> StyledObject<String> {
    let label = tier.to_string();
    match tier {
        QualityTier::Strict => style(label).green(),
        QualityTier::Recovered => style(label).yellow(),
        QualityTier::RawFallback => style(label).red(),
    }
}

pub fn styled_status(status: VerificationStatus) -> StyledObject<String> {
    let label = status.to_string();
    match status {
        VerificationStatus::Success => style(label).green().bold(),
        VerificationStatus::Failed => style(label).red().bold(),
        VerificationStatus::Pending => style(label).yellow(),
        VerificationStatus::Idle => style(label).dim(),
    }
}
