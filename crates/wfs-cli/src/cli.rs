use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wfsm",
    about = "Inspect WFS 2.0 schema descriptors and content-model snapshots",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a schema descriptor
    Schema(SchemaArgs),
    /// Load and validate a TOML schema descriptor
    Check(CheckArgs),
    /// List the choice groups of a container type
    Groups(GroupsArgs),
    /// Restore a JSON snapshot and print its tree
    Inspect(InspectArgs),
    /// Build a sample transaction and print it
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Descriptor file; defaults to the built-in WFS 2.0 descriptor
    #[arg(long)]
    pub schema: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CheckArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct GroupsArgs {
    /// Container type name, e.g. TransactionType
    pub container: String,
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    pub snapshot: PathBuf,
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Print the snapshot as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_schema_defaults_to_text() {
        let cli = Cli::try_parse_from(["wfsm", "schema"]).unwrap();
        if let Command::Schema(args) = cli.command {
            assert!(matches!(args.format, OutputFormat::Text));
            assert!(args.schema.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_schema_toml() {
        let cli = Cli::try_parse_from(["wfsm", "schema", "--format", "toml", "--schema", "wfs.toml"]).unwrap();
        if let Command::Schema(args) = cli.command {
            assert!(matches!(args.format, OutputFormat::Toml));
            assert_eq!(args.schema, Some(PathBuf::from("wfs.toml")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_groups() {
        let cli = Cli::try_parse_from(["wfsm", "groups", "TransactionType"]).unwrap();
        if let Command::Groups(args) = cli.command {
            assert_eq!(args.container, "TransactionType");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["wfsm", "inspect", "tx.json"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect(_)));
    }

    #[test]
    fn verbose_is_global_and_counted() {
        let cli = Cli::try_parse_from(["wfsm", "demo", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        if let Command::Demo(args) = cli.command {
            assert!(args.json);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn check_requires_a_file() {
        assert!(Cli::try_parse_from(["wfsm", "check"]).is_err());
    }
}
