use std::path::PathBuf;

use anyhow::{bail, Context};
use cas_rpc::{RpcDispatcher, RpcOutcome, RpcRequest};
use cas_server::{open_store, CasServer, ServerConfig};
use cas_store::{ObjectStore, StoreStats};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cli::*;

/// Object directory used by the local commands when none is configured.
pub const DEFAULT_DATA_DIR: &str = ".cas";

/// The file named by `--config`, or the built-in defaults.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

pub fn run_command(cli: Cli, config: ServerConfig) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args, config),
        Command::Write(args) => cmd_write(args, config, format),
        Command::Read(args) => cmd_read(args, config, format),
        Command::Stat(args) => cmd_stat(args, config, format),
        Command::Config => cmd_config(&config),
    }
}

fn cmd_serve(args: ServeArgs, mut config: ServerConfig) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.memory {
        config.data_dir = None;
    } else if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }

    debug!(?config, "resolved server config");
    let server = CasServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_write(args: WriteArgs, config: ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = local_config(args.store, config);
    info!(data_dir = %data_dir(&config), bytes = args.data.len(), "writing payload");
    let address = write_payload(&config, &args.data)?;
    match format {
        OutputFormat::Text => println!("{address}"),
        OutputFormat::Json => println!("{}", json!({ "address": address })),
    }
    Ok(())
}

fn cmd_read(args: ReadArgs, config: ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = local_config(args.store, config);
    info!(data_dir = %data_dir(&config), address = %args.address, "reading payload");
    let data = read_payload(&config, &args.address)?;
    match format {
        OutputFormat::Text => println!("{data}"),
        OutputFormat::Json => println!("{}", json!({ "address": args.address, "data": data })),
    }
    Ok(())
}

fn cmd_stat(args: StoreArgs, config: ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = local_config(args, config);
    debug!(data_dir = %data_dir(&config), "collecting store stats");
    let stats = store_stats(&config)?;
    match format {
        OutputFormat::Text => {
            let root = config.data_dir.unwrap_or_default();
            println!("Store: {}", root.display().to_string().bold());
            println!("  Objects: {}", stats.objects.to_string().cyan());
            println!("  Bytes:   {}", stats.total_bytes.to_string().cyan());
            println!("  Hash:    {}", config.hash_algorithm.to_string().yellow());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&stats)?),
    }
    Ok(())
}

fn cmd_config(config: &ServerConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Local commands always work against a directory so results persist.
fn local_config(args: StoreArgs, mut config: ServerConfig) -> ServerConfig {
    let dir = args
        .data_dir
        .or(config.data_dir.take())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    config.data_dir = Some(dir);
    config
}

fn data_dir(config: &ServerConfig) -> String {
    config
        .data_dir
        .as_deref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default()
}

fn dispatcher(config: &ServerConfig) -> anyhow::Result<RpcDispatcher> {
    let store = open_store(config)?;
    Ok(RpcDispatcher::new(store, &config.engine_config()))
}

/// Run one call through the same dispatcher the server uses.
fn call(dispatcher: &RpcDispatcher, request: RpcRequest) -> anyhow::Result<Value> {
    let response = dispatcher.dispatch(serde_json::to_value(request)?);
    match response.outcome {
        RpcOutcome::Result(value) => Ok(value),
        RpcOutcome::Error(e) => bail!("{} (code {})", e.message, e.code),
    }
}

fn expect_string(value: Value) -> anyhow::Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => bail!("unexpected result {other}"),
    }
}

pub fn write_payload(config: &ServerConfig, data: &str) -> anyhow::Result<String> {
    let d = dispatcher(config)?;
    expect_string(call(&d, RpcRequest::write("cli", data))?)
}

pub fn read_payload(config: &ServerConfig, address: &str) -> anyhow::Result<String> {
    let d = dispatcher(config)?;
    payload_text(call(&d, RpcRequest::read("cli", address))?)
}

/// Binary payloads arrive as `{"encoding": "hex", "data": ...}` and print as `hex:<data>`.
fn payload_text(value: Value) -> anyhow::Result<String> {
    if value.get("encoding").and_then(Value::as_str) == Some("hex") {
        if let Some(data) = value.get("data").and_then(Value::as_str) {
            return Ok(format!("hex:{data}"));
        }
    }
    expect_string(value)
}

pub fn store_stats(config: &ServerConfig) -> anyhow::Result<StoreStats> {
    Ok(open_store(config)?.stats()?)
}
