//! Command line of the `kummerkasten` binary.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kummerkasten")]
#[command(about = "Ticket triage for the Kummerkasten feedback box", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Filtered, sorted ticket overview split by semester
    Overview {
        /// Query string, e.g. "status=new+open&labels=Mensa&sort=Titel&ord=desc"
        query: Option<String>,
    },
    /// List all labels
    Labels,
    /// List the labels offered on the public form
    FormLabels,
    /// List the FAQ entries in display order
    Faq,
    /// Show the footer and about-section settings
    Settings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overview_query_is_optional() {
        let cli = Cli::try_parse_from(["kummerkasten", "overview"]).unwrap();
        assert_eq!(cli.command, Command::Overview { query: None });

        let cli = Cli::try_parse_from(["kummerkasten", "overview", "status="]).unwrap();
        assert_eq!(
            cli.command,
            Command::Overview {
                query: Some("status=".into())
            }
        );
    }

    #[test]
    fn subcommands_use_kebab_case() {
        let cli = Cli::try_parse_from(["kummerkasten", "form-labels"]).unwrap();
        assert_eq!(cli.command, Command::FormLabels);
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["kummerkasten", "overview", "status=", "extra"]).is_err());
        assert!(Cli::try_parse_from(["kummerkasten", "labels", "extra"]).is_err());
        assert!(Cli::try_parse_from(["kummerkasten", "tickets"]).is_err());
    }

    #[test]
    fn help_is_handled_by_clap() {
        let err = Cli::try_parse_from(["kummerkasten", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
