//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vault", version, about = "Person index, GTD and link integrity for a markdown vault")]
pub(crate) struct Cli {
    /// Vault root; overrides the config file and VAULT_ROOT
    #[arg(long, global = true)]
    pub(crate) vault: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Emit JSON output and JSON logs
    #[arg(long, global = true)]
    pub(crate) json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Build the person index and report preamble problems
    People {
        /// Write the people.index.json snapshot here
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Categorize cached reminders into a GTD board
    Gtd {
        /// Reminders cache JSON
        #[arg(long)]
        reminders: PathBuf,

        /// Infer missing due dates from titles
        #[arg(long)]
        infer_due: bool,
    },

    /// Extract and resolve every reference
    Links {
        /// Only print broken references
        #[arg(long)]
        broken_only: bool,
    },

    /// Rewrite references using a moves table
    Repair {
        /// TOML (`[moves]`) or JSON repair map
        #[arg(long)]
        map: PathBuf,

        /// Report changes without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// People and links together; exits 2 when errors are found
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vault", "links", "--broken-only", "--vault", "/v", "-v"]).unwrap();
        assert_eq!(cli.vault, Some(PathBuf::from("/v")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Links { broken_only: true }));
    }

    #[test]
    fn repair_requires_map() {
        assert!(Cli::try_parse_from(["vault", "repair"]).is_err());
        let cli = Cli::try_parse_from(["vault", "--json", "repair", "--map", "moves.toml", "--dry-run"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Repair { dry_run: true, .. }));
    }

    #[test]
    fn gtd_flags() {
        let cli = Cli::try_parse_from(["vault", "gtd", "--reminders", "cache.json", "--infer-due"]).unwrap();
        match cli.command {
            Command::Gtd { reminders, infer_due } => {
                assert_eq!(reminders, PathBuf::from("cache.json"));
                assert!(infer_due);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
