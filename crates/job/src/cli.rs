//! Command-line arguments.

use std::num::NonZeroUsize;

use clap::{Parser, Subcommand};
use nudge_core::config::JobConfig;

/// Daily habit reminder: texts users who did not log anything yesterday.
#[derive(Parser, Debug)]
#[command(name = "nudge-job", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Evaluate everyone but log reminders instead of sending them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Users processed at once (overrides NUDGE_CONCURRENCY).
    #[arg(long, global = true)]
    pub concurrency: Option<NonZeroUsize>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the reminder job once (default).
    Run,
    /// Print OK and exit; used as a container probe.
    Healthcheck,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Flags given on the command line win over the environment.
    pub fn apply(&self, job: &mut JobConfig) {
        if self.dry_run {
            job.dry_run = true;
        }
        if let Some(n) = self.concurrency {
            job.concurrency = n.get();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_config() -> JobConfig {
        JobConfig {
            dry_run: false,
            reminder_body: "hi".into(),
            concurrency: 1,
        }
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["nudge-job"]).unwrap();
        assert_eq!(cli.command(), Command::Run);
        assert!(!cli.dry_run);
    }

    #[test]
    fn healthcheck_subcommand() {
        let cli = Cli::try_parse_from(["nudge-job", "healthcheck"]).unwrap();
        assert_eq!(cli.command(), Command::Healthcheck);
    }

    #[test]
    fn flags_override_environment() {
        let cli =
            Cli::try_parse_from(["nudge-job", "run", "--dry-run", "--concurrency", "4"]).unwrap();
        let mut job = job_config();
        cli.apply(&mut job);
        assert!(job.dry_run);
        assert_eq!(job.concurrency, 4);
    }

    #[test]
    fn absent_flags_keep_environment() {
        let cli = Cli::try_parse_from(["nudge-job"]).unwrap();
        let mut job = JobConfig {
            dry_run: true,
            concurrency: 8,
            ..job_config()
        };
        cli.apply(&mut job);
        assert!(job.dry_run);
        assert_eq!(job.concurrency, 8);
    }

    #[test]
    fn zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["nudge-job", "--concurrency", "0"]).is_err());
    }
}
