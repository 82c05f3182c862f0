use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use crdkv_client::HttpObjectClient;
use crdkv_store::{KeyValue, KeyValueStore, Storage};
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(&cli)?;
    let client = HttpObjectClient::new(&config.client).context("creating api client")?;
    let storage = Storage::new(Arc::new(client), config.storage).context("creating storage")?;

    let run = execute(&storage, cli.command, &cli.format);
    match cli.deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .with_context(|| format!("deadline of {secs}s exceeded"))?,
        None => run.await,
    }
}

async fn execute(storage: &Storage, command: Command, format: &OutputFormat) -> anyhow::Result<()> {
    match command {
        Command::Boot => cmd_boot(storage, format).await,
        Command::Put(args) => cmd_put(storage, args, format).await,
        Command::Get(args) => cmd_get(storage, args, format).await,
        Command::Exists(args) => cmd_exists(storage, args, format).await,
        Command::List(args) => cmd_list(storage, args, format).await,
        Command::Delete(args) => cmd_delete(storage, args, format).await,
    }
}

async fn cmd_boot(storage: &Storage, format: &OutputFormat) -> anyhow::Result<()> {
    storage.boot().await?;
    let doc = storage.document();
    match format {
        OutputFormat::Text => println!(
            "{} Store ready at {}/{}",
            "✓".green().bold(),
            doc.namespace.bold(),
            doc.name.yellow()
        ),
        OutputFormat::Json => println!(
            "{}",
            json!({"namespace": doc.namespace, "name": doc.name, "kind": doc.kind.kind()})
        ),
    }
    Ok(())
}

async fn cmd_put(storage: &Storage, args: PutArgs, format: &OutputFormat) -> anyhow::Result<()> {
    storage.put(&args.key, &args.value).await?;
    match format {
        OutputFormat::Text => println!("{} {}", "set".green(), args.key.bold()),
        OutputFormat::Json => println!("{}", json!({"key": args.key, "value": args.value})),
    }
    Ok(())
}

async fn cmd_get(storage: &Storage, args: KeyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let value = storage.search(&args.key).await?;
    match format {
        OutputFormat::Text => println!("{value}"),
        OutputFormat::Json => println!("{}", json!({"key": args.key, "value": value})),
    }
    Ok(())
}

async fn cmd_exists(storage: &Storage, args: KeyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let exists = storage.exists(&args.key).await?;
    match format {
        OutputFormat::Text => {
            let answer = if exists { "yes".green() } else { "no".red() };
            println!("{} {}", args.key.bold(), answer);
        }
        OutputFormat::Json => println!("{}", json!({"key": args.key, "exists": exists})),
    }
    Ok(())
}

async fn cmd_list(storage: &Storage, args: ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut list: Vec<KeyValue> = storage.list(&args.prefix).await?;
    list.sort();
    match format {
        OutputFormat::Text => {
            if list.is_empty() {
                println!("No keys under {}.", args.prefix.bold());
            }
            for kv in &list {
                println!("{} = {}", kv.key.cyan(), kv.value);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&list)?),
    }
    Ok(())
}

async fn cmd_delete(storage: &Storage, args: KeyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    storage.delete(&args.key).await?;
    match format {
        OutputFormat::Text => println!("{} {}", "deleted".green(), args.key.bold()),
        OutputFormat::Json => println!("{}", json!({"key": args.key, "deleted": true})),
    }
    Ok(())
}
