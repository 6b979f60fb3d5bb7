// crates/spine-cli/src/main.rs
// ============================================================================
// Module: Spine CLI Entry Point
// Description: Command dispatcher for offline verification and server hosting.
// Purpose: Provide operator workflows over proof bundles and the HTTP API.
// Dependencies: clap, spine-core, spine-server, spine-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! The Spine CLI covers the audit-consumer contract (`verify` recomputes a
//! bundle's digest from its items), store inspection (`show`), and hosting
//! (`serve`). Inputs are untrusted and validated before use; exit codes are
//! stable: 0 success, 1 verification or lookup failure, 2 usage or I/O error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use spine_core::ProofBundle;
use spine_core::ProofBundleId;
use spine_core::ProofBundleStore;
use spine_core::hashing::canonical_json_bytes;
use spine_server::ServerConfig;
use spine_server::SpineServer;
use spine_store_sqlite::MAX_BUNDLE_BYTES;
use spine_store_sqlite::SqliteProofBundleStore;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Spine operator command line.
#[derive(Debug, Parser)]
#[command(name = "spine", about = "Proof bundle verification and Spine API hosting")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Re-verify a proof bundle document by recomputing its digest.
    Verify(VerifyCommand),
    /// Print a stored proof bundle from a SQLite store.
    Show(ShowCommand),
    /// Run the Spine HTTP API.
    Serve(ServeCommand),
}

/// Arguments for the verify subcommand.
#[derive(Debug, Args)]
struct VerifyCommand {
    /// Path to a proof bundle JSON document.
    #[arg(long)]
    bundle: PathBuf,
}

/// Arguments for the show subcommand.
#[derive(Debug, Args)]
struct ShowCommand {
    /// Path to the SQLite proof bundle store.
    #[arg(long)]
    db: PathBuf,
    /// Proof bundle identifier to print.
    #[arg(long)]
    id: String,
}

/// Arguments for the serve subcommand.
#[derive(Debug, Args)]
struct ServeCommand {
    /// Path to the server TOML configuration.
    #[arg(long)]
    config: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure with a stable exit code.
#[derive(Debug)]
struct CliError {
    /// Message emitted to stderr.
    message: String,
    /// Process exit code.
    code: u8,
}

impl CliError {
    /// Creates a verification or lookup failure (exit code 1).
    fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }

    /// Creates a usage or I/O failure (exit code 2).
    fn usage(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 2,
        }
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&err.message);
            ExitCode::from(err.code)
        }
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Verify(command) => command_verify(&command)?,
        Commands::Show(command) => command_show(&command)?,
        Commands::Serve(command) => command_serve(command).await?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Recomputes a bundle digest and compares it with the stored integrity.
fn command_verify(command: &VerifyCommand) -> CliResult<()> {
    let bundle = read_bundle(&command.bundle)?;
    let recomputed = bundle
        .recompute_integrity()
        .map_err(|err| CliError::usage(format!("failed to canonicalize bundle: {err}")))?;
    if recomputed.sha256 == bundle.integrity.sha256 {
        write_stdout_line(&format!("bundle verified: sha256 {}", recomputed.sha256))
            .map_err(|err| CliError::usage(format!("failed to write stdout: {err}")))?;
        Ok(())
    } else {
        Err(CliError::failure(format!(
            "integrity mismatch: stored {} recomputed {}",
            bundle.integrity.sha256, recomputed.sha256
        )))
    }
}

/// Prints a stored bundle as canonical JSON.
fn command_show(command: &ShowCommand) -> CliResult<()> {
    let store = SqliteProofBundleStore::open(&command.db)
        .map_err(|err| CliError::usage(format!("failed to open store: {err}")))?;
    let bundle = store
        .get(&ProofBundleId::new(command.id.as_str()))
        .map_err(|err| CliError::usage(format!("failed to load bundle: {err}")))?
        .ok_or_else(|| CliError::failure(format!("bundle not found: {}", command.id)))?;
    let bytes = canonical_json_bytes(&bundle)
        .map_err(|err| CliError::usage(format!("failed to serialize bundle: {err}")))?;
    write_stdout_bytes(&bytes)
        .and_then(|()| write_stdout_line(""))
        .map_err(|err| CliError::usage(format!("failed to write stdout: {err}")))?;
    Ok(())
}

/// Loads the configuration and serves the HTTP API until stopped.
async fn command_serve(command: ServeCommand) -> CliResult<()> {
    let config = ServerConfig::load(&command.config)
        .map_err(|err| CliError::usage(err.to_string()))?;
    let server = SpineServer::bind(&config)
        .await
        .map_err(|err| CliError::usage(err.to_string()))?;
    let addr = server.local_addr().map_err(|err| CliError::usage(err.to_string()))?;
    write_stdout_line(&format!("spine api listening on {addr}"))
        .map_err(|err| CliError::usage(format!("failed to write stdout: {err}")))?;
    server.serve().await.map_err(|err| CliError::usage(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads and parses a proof bundle document with a size limit.
fn read_bundle(path: &Path) -> CliResult<ProofBundle> {
    let metadata =
        fs::metadata(path).map_err(|err| CliError::usage(format!("failed to read bundle: {err}")))?;
    if metadata.len() > MAX_BUNDLE_BYTES as u64 {
        return Err(CliError::usage(format!(
            "bundle document exceeds size limit: {} bytes (max {MAX_BUNDLE_BYTES})",
            metadata.len()
        )));
    }
    let bytes =
        fs::read(path).map_err(|err| CliError::usage(format!("failed to read bundle: {err}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::usage(format!("failed to parse bundle: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
