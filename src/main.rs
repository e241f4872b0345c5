use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use arboard::Clipboard;
use clap::Parser;
use tracing::{debug, info, warn};

use callsmith::app::Workbench;
use callsmith::config::{self, Config};
use callsmith::core::{parse_command, Action, NotifyLevel};
use callsmith::infrastructure::abi::{load_file, standard_catalog};
use callsmith::infrastructure::ethereum::ProviderConfig;
use callsmith::infrastructure::{AbiScanner, RuntimeBridge, RuntimeCommand};
use callsmith::logging::init_tracing;

/// How long the prompt waits for an in-flight request before giving control back
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
#[command(
    name = "callsmith",
    version,
    about = "Callsmith: build, encode and execute EVM contract calls"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, conflicts_with = "rpc")]
    ws: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra interface file to load (JSON ABI or artifact)
    #[arg(long)]
    abi: Vec<PathBuf>,

    /// Interface to select on startup (e.g. erc20)
    #[arg(long)]
    standard: Option<String>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    init_tracing(&config.log);

    let endpoint = args
        .ws
        .clone()
        .or_else(|| args.rpc.clone())
        .unwrap_or_else(|| config.rpc.clone());
    let runtime = RuntimeBridge::new(ProviderConfig::from_url(&endpoint), config.private_key())?;

    let mut app = Workbench::new(build_catalog(&config), config.default_decimals);
    for path in &args.abi {
        match load_file(path) {
            Ok(interface) => {
                app.add_interface(interface);
            }
            Err(err) => warn!(path = %path.display(), error = %format!("{:#}", err), "skipping interface file"),
        }
    }
    if let Some(name) = &args.standard {
        let action = app.execute_command(&parse_command(&format!("use {}", name)));
        apply(&mut app, action);
    }

    info!(endpoint = %endpoint, interfaces = app.catalog().len(), "callsmith ready");
    println!(
        "callsmith: {} interfaces loaded, endpoint {} (type `help`)",
        app.catalog().len(),
        endpoint
    );
    print_status(&mut app);

    run_prompt(&mut app, &runtime)?;
    let _ = runtime.send(RuntimeCommand::Shutdown);
    Ok(())
}

fn run_prompt(app: &mut Workbench, runtime: &RuntimeBridge) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("callsmith> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let action = app.execute_command(&parse_command(&line));
        if action == Action::Quit {
            return Ok(());
        }
        apply(app, action);

        dispatch_requests(app, runtime);
        settle(app, runtime);
    }
}

/// Hand queued requests to the runtime worker
fn dispatch_requests(app: &mut Workbench, runtime: &RuntimeBridge) {
    for (operation, cmd) in app.take_runtime_commands() {
        if let Err(err) = runtime.send(cmd) {
            let action = app.abort_request(operation, format!("Runtime unavailable: {}", err));
            apply(app, action);
        }
    }
}

/// Block until every in-flight request has completed or the wait times out
fn settle(app: &mut Workbench, runtime: &RuntimeBridge) {
    let started = Instant::now();
    while app.is_busy() {
        let remaining = SETTLE_TIMEOUT.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            println!("(still waiting, results will show after the next command)");
            break;
        }
        if let Some(event) = runtime.recv_timeout(remaining) {
            let action = app.apply_event(event);
            apply(app, action);
        }
    }

    for event in runtime.poll_events() {
        let action = app.apply_event(event);
        apply(app, action);
    }
}

fn apply(app: &mut Workbench, action: Action) {
    match &action {
        Action::Print(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Action::Copy(text) => copy_to_clipboard(app, text),
        Action::Notify(..) => app.apply_action(&action),
        Action::None | Action::Quit => {}
    }
    print_status(app);
}

fn copy_to_clipboard(app: &mut Workbench, text: &str) {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => app.set_status(format!("Copied: {}", text), NotifyLevel::Info),
        Err(_) => {
            println!("{}", text);
            app.set_status("Clipboard not available", NotifyLevel::Warn);
        }
    }
}

fn print_status(app: &mut Workbench) {
    if let Some(status) = app.take_status() {
        println!("{}{}", status.level.prefix(), status.text);
    }
}

fn build_catalog(config: &Config) -> callsmith::domain::abi::Catalog {
    let mut catalog = standard_catalog();
    let scanned = AbiScanner::scan_roots(&abi_scan_roots_from_config(config));
    for error in &scanned.errors {
        debug!(error = %error, "interface file skipped");
    }
    catalog.merge(scanned);
    catalog
}

fn abi_scan_roots_from_config(config: &Config) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for raw in &config.abi_paths {
        if let Some(path) = expand_path(raw) {
            roots.push(path);
        }
    }
    if roots.is_empty() {
        roots.push(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    }
    roots
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}
