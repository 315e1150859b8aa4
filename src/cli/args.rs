//! CLI argument definitions using clap
//!
//! Commands:
//! - mdbsql tables --config <path>
//! - mdbsql describe --config <path> --table <name>
//! - mdbsql query --config <path>   (query request as JSON on stdin)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mdbsql - filter and project rows of a tabular data source
#[derive(Parser, Debug)]
#[command(name = "mdbsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tables of the data source
    Tables {
        /// Path to configuration file
        #[arg(long, default_value = "./mdbsql.json")]
        config: PathBuf,

        /// Data source to open instead of the configured one
        #[arg(long)]
        source: Option<String>,
    },

    /// Describe the columns of one table
    Describe {
        /// Path to configuration file
        #[arg(long, default_value = "./mdbsql.json")]
        config: PathBuf,

        /// Data source to open instead of the configured one
        #[arg(long)]
        source: Option<String>,

        /// Table to describe
        #[arg(long)]
        table: String,
    },

    /// Run one query read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./mdbsql.json")]
        config: PathBuf,

        /// Data source to open instead of the configured one
        #[arg(long)]
        source: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_describe() {
        let cli = Cli::try_parse_from(["mdbsql", "describe", "--table", "Orders"]).unwrap();
        match cli.command {
            Command::Describe { config, source, table } => {
                assert_eq!(config, PathBuf::from("./mdbsql.json"));
                assert!(source.is_none());
                assert_eq!(table, "Orders");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_describe_requires_table() {
        assert!(Cli::try_parse_from(["mdbsql", "describe"]).is_err());
    }
}
