use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crdkv",
    about = "crdkv: hierarchical key-value storage in a custom resource",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [client] and [storage] tables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API server URL, overrides the config file
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Namespace of the document, overrides the config file
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Name of the document, overrides the config file
    #[arg(short, long, global = true)]
    pub document: Option<String>,

    /// Abort the command if it has not finished after this many seconds
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the schema, namespace and document if missing
    Boot,
    /// Set a key
    Put(PutArgs),
    /// Print the value of a key
    Get(KeyArgs),
    /// Report whether a key is present
    Exists(KeyArgs),
    /// List keys under a prefix
    List(ListArgs),
    /// Remove a key
    Delete(KeyArgs),
}

#[derive(Args)]
pub struct PutArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(default_value = "/")]
    pub prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_put_with_overrides() {
        let cli = Cli::try_parse_from([
            "crdkv", "--namespace", "giantswarm", "-d", "it", "put", "/app/config", "v1",
        ])
        .unwrap();
        assert_eq!(cli.namespace.as_deref(), Some("giantswarm"));
        assert_eq!(cli.document.as_deref(), Some("it"));
        match cli.command {
            Command::Put(args) => {
                assert_eq!(args.key, "/app/config");
                assert_eq!(args.value, "v1");
            }
            _ => panic!("expected put"),
        }
    }

    #[test]
    fn list_defaults_to_root() {
        let cli = Cli::try_parse_from(["crdkv", "list"]).unwrap();
        match cli.command {
            Command::List(args) => assert_eq!(args.prefix, "/"),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn put_requires_value() {
        assert!(Cli::try_parse_from(["crdkv", "put", "/k"]).is_err());
    }
}
