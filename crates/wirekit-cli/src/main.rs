use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wirekit_core::{Crc32, WireError};
use wirekit_core::container::{
    ContainerError, ContainerReport, ContainerWriter, build_report, is_container_magic,
    parse_container, read_magic,
};
use wirekit_core::io::{ConcatReader, SubsetReader};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WIREKIT_BUILD_COMMIT"),
    " ",
    env!("WIREKIT_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "wirekit")]
#[command(version = VERSION)]
#[command(
    about = "Pack, inspect and verify checksummed WKC1 containers.",
    long_about = None,
    after_help = "Examples:\n  wirekit pack logs/*.bin -o logs.wkc\n  wirekit inspect logs.wkc --stdout --pretty\n  wirekit unpack logs.wkc -d restored\n  wirekit crc32 firmware.img --offset 512 --length 4096\n  wirekit crc32 part1.bin part2.bin"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files into a container, one entry per file.
    Pack {
        /// Files or glob patterns to pack
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output container path
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Creation time in unix seconds (defaults to now)
        #[arg(long, allow_negative_numbers = true)]
        timestamp: Option<i64>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Verify a container and generate a JSON report.
    #[command(
        after_help = "Examples:\n  wirekit inspect logs.wkc -o report.json\n  wirekit inspect logs.wkc --stdout --strict"
    )]
    Inspect {
        /// Path to a container file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any checksum mismatches
        #[arg(long)]
        strict: bool,
    },
    /// Extract every entry of a container into a directory.
    Unpack {
        /// Path to a container file
        input: PathBuf,

        /// Destination directory (created if missing)
        #[arg(short = 'd', long)]
        dir: PathBuf,

        /// Extract entries whose checksum does not match
        #[arg(long)]
        force: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Print the CRC-32 of a file, of a byte window inside it, or of several
    /// files read back to back.
    Crc32 {
        /// Files or glob patterns, checksummed in order as one stream
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// First byte of the window (single input only)
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Window length, defaults to the rest of the file (single input only)
        #[arg(long)]
        length: Option<u64>,

        /// Print a JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Pack {
            inputs,
            output,
            timestamp,
            quiet,
        } => cmd_pack(inputs, output, timestamp, quiet),
        Commands::Inspect {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
        } => cmd_inspect(input, report, stdout, pretty, compact, quiet, strict),
        Commands::Unpack {
            input,
            dir,
            force,
            quiet,
        } => cmd_unpack(input, dir, force, quiet),
        Commands::Crc32 {
            inputs,
            offset,
            length,
            json,
        } => cmd_crc32(inputs, offset, length, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pack(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    timestamp: Option<i64>,
    quiet: bool,
) -> Result<(), CliError> {
    let files = expand_inputs(&inputs)?;
    let output_target = resolve_output_target(&output)?;

    let mut names = HashSet::new();
    for file in &files {
        validate_input_file(file)?;
        let name = entry_name(file)?;
        if !names.insert(name.clone()) {
            return Err(CliError::new(
                format!("duplicate entry name '{}'", name),
                Some("entries are named by file name; rename one of the inputs".to_string()),
            ));
        }
        let file_abs = fs::canonicalize(file)
            .with_context(|| format!("Failed to resolve input path: {}", file.display()))?;
        if output_target.as_ref() == Some(&file_abs) {
            return Err(CliError::new(
                format!("output path must differ from inputs: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }

    let created_at = timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
    let mut writer = ContainerWriter::new(created_at);
    for file in &files {
        let name = entry_name(file)?;
        let mut handle = File::open(file)
            .with_context(|| format!("Failed to open input file: {}", file.display()))?;
        let size = writer
            .add_entry_from_reader(&name, &mut handle)
            .map_err(|err| container_error(err, file))?;
        info!(entry = %name, size, "packed");
    }
    let count = writer.entry_count();
    let bytes = writer
        .finish()
        .map_err(|err| container_error(err, &output))?;

    create_parent_dir(&output)?;
    fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write container: {}", output.display()))?;

    if !quiet {
        eprintln!(
            "OK: packed {} entries ({} bytes) -> {}",
            count,
            bytes.len(),
            output.display()
        );
    }
    Ok(())
}

fn cmd_inspect(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_container_file(&resolved_input)?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        let input_abs = fs::canonicalize(&resolved_input).with_context(|| {
            format!("Failed to resolve input path: {}", resolved_input.display())
        })?;
        if resolve_output_target(report_path)? == Some(input_abs) {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }

    let bytes = fs::read(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let container = parse_container(&bytes).map_err(|err| container_error(err, &resolved_input))?;
    let rep = build_report(
        &container,
        &resolved_input.display().to_string(),
        bytes.len() as u64,
    );
    let json = serialize_report(&rep, pretty, compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            create_parent_dir(&report)?;
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if strict && rep.has_corruption() {
        return Err(CliError::new(
            "checksum mismatches detected",
            Some(corruption_hint(&rep)),
        ));
    }
    Ok(())
}

fn cmd_unpack(input: PathBuf, dir: PathBuf, force: bool, quiet: bool) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_container_file(&resolved_input)?;
    let bytes = fs::read(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let container = parse_container(&bytes).map_err(|err| container_error(err, &resolved_input))?;

    let corrupted: Vec<&str> = container
        .corrupted_entries()
        .map(|entry| entry.name)
        .collect();
    if !corrupted.is_empty() && !force {
        return Err(CliError::new(
            format!(
                "{} corrupted entries: {}",
                corrupted.len(),
                corrupted.join(", ")
            ),
            Some("use --force to extract them anyway".to_string()),
        ));
    }
    if !container.trailer_ok() {
        warn!("container trailer checksum mismatch");
    }

    let mut targets = Vec::with_capacity(container.entries.len());
    let mut seen = HashSet::new();
    for entry in &container.entries {
        let file_name = Path::new(entry.name).file_name().ok_or_else(|| {
            CliError::new(
                format!("entry {} has no usable file name: '{}'", entry.index, entry.name),
                Some("the container may have been produced by another tool".to_string()),
            )
        })?;
        if !seen.insert(file_name.to_os_string()) {
            return Err(CliError::new(
                format!("several entries extract to '{}'", file_name.to_string_lossy()),
                Some("unpack into separate directories with a tool that keeps paths".to_string()),
            ));
        }
        targets.push((dir.join(file_name), entry));
    }

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    for (target, entry) in &targets {
        fs::write(target, entry.payload)
            .with_context(|| format!("Failed to write entry: {}", target.display()))?;
        debug!(entry = entry.name, path = %target.display(), "extracted");
    }

    if !quiet {
        eprintln!(
            "OK: unpacked {} entries -> {}",
            targets.len(),
            dir.display()
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CrcOutput {
    inputs: Vec<String>,
    offset: u64,
    length: u64,
    crc32: String,
}

fn cmd_crc32(
    inputs: Vec<PathBuf>,
    offset: u64,
    length: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let files = expand_inputs(&inputs)?;
    for file in &files {
        validate_input_file(file)?;
    }
    let (crc, length) = match files.as_slice() {
        [single] => crc_window(single, offset, length)?,
        _ if offset != 0 || length.is_some() => {
            return Err(CliError::new(
                "--offset and --length apply to a single input",
                Some("run once per file to checksum a window".to_string()),
            ));
        }
        _ => crc_concatenated(&files)?,
    };
    let value = format!("{crc:08x}");
    let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();

    if json {
        let out = CrcOutput {
            inputs: names,
            offset,
            length,
            crc32: value,
        };
        let text = serde_json::to_string(&out).context("JSON serialization failed")?;
        println!("{}", text);
    } else {
        println!("{}  {}", value, names.join(" "));
    }
    Ok(())
}

/// CRC-32 and length of `[offset, offset + length)` in one file.
fn crc_window(path: &Path, offset: u64, length: Option<u64>) -> Result<(u32, u64), CliError> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let file_len = file
        .metadata()
        .with_context(|| format!("Failed to read input file: {}", path.display()))?
        .len();
    let window_hint = || Some(format!("the window must lie inside the file ({file_len} bytes)"));
    let length = match length {
        Some(length) => length,
        None => file_len.checked_sub(offset).ok_or_else(|| {
            CliError::new(format!("offset {offset} is past the end of the file"), window_hint())
        })?,
    };
    let mut window = SubsetReader::new(file, offset, length)
        .map_err(|err| CliError::new(format!("invalid window: {err}"), window_hint()))?;

    let mut crc = Crc32::new();
    io::copy(&mut window, &mut crc)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    Ok((crc.value(), length))
}

/// CRC-32 and total length of every file read back to back.
fn crc_concatenated(files: &[PathBuf]) -> Result<(u32, u64), CliError> {
    let mut handles = Vec::with_capacity(files.len());
    for file in files {
        let handle = File::open(file)
            .with_context(|| format!("Failed to open input file: {}", file.display()))?;
        handles.push(handle);
    }
    let mut reader = ConcatReader::new(handles);
    let mut crc = Crc32::new();
    let total = io::copy(&mut reader, &mut crc).context("Failed to read input files")?;
    debug!(files = files.len(), bytes = total, "checksummed concatenated inputs");
    Ok((crc.value(), total))
}

fn serialize_report(
    rep: &ContainerReport,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn corruption_hint(rep: &ContainerReport) -> String {
    let names: Vec<&str> = rep
        .entries
        .iter()
        .filter(|entry| !entry.crc_ok)
        .map(|entry| entry.name.as_str())
        .collect();
    if names.is_empty() {
        "only the trailer checksum differs; the file may have been truncated or appended to"
            .to_string()
    } else {
        format!("corrupted entries: {}", names.join(", "))
    }
}

fn container_error(err: ContainerError, path: &Path) -> CliError {
    let hint = match &err {
        ContainerError::TooShort { .. } | ContainerError::BadMagic { .. } => {
            Some("expected a file produced by `wirekit pack`".to_string())
        }
        ContainerError::UnsupportedVersion { .. } => {
            Some("this build reads container version 1 only".to_string())
        }
        ContainerError::NameTooLong { .. } => {
            Some("rename the input to a shorter file name".to_string())
        }
        ContainerError::Wire(WireError::Overflow { .. }) => {
            Some("entries and the entry count are limited to 32-bit sizes".to_string())
        }
        ContainerError::Wire(_)
        | ContainerError::RecordLength { .. }
        | ContainerError::InvalidName { .. }
        | ContainerError::TrailingBytes { .. } => {
            Some("the container is truncated or damaged".to_string())
        }
        _ => None,
    };
    CliError::new(format!("{}: {}", path.display(), err), hint)
}

fn entry_name(file: &Path) -> Result<String, CliError> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::new(
                format!("input has no UTF-8 file name: {}", file.display()),
                Some("entry names are stored as UTF-8".to_string()),
            )
        })
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass regular files, not directories".to_string()),
        ));
    }
    Ok(())
}

fn validate_container_file(input: &Path) -> Result<(), CliError> {
    validate_input_file(input)?;
    let mut file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let magic = read_magic(&mut file).ok().flatten();
    if !magic.as_ref().is_some_and(is_container_magic) {
        return Err(CliError::new(
            format!("not a wirekit container: {}", input.display()),
            Some("expected a file produced by `wirekit pack`".to_string()),
        ));
    }
    Ok(())
}

/// Absolute path `output` will be written to, when its parent exists.
fn resolve_output_target(output: &Path) -> Result<Option<PathBuf>, CliError> {
    let parent = match output.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Ok(None),
    };
    if !parent.exists() {
        return Ok(None);
    }
    let parent_abs = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve output path: {}", output.display()))?;
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    Ok(Some(parent_abs.join(file_name)))
}

fn create_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Expand every input, keeping command-line order and glob order within a
/// pattern.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for input in inputs {
        let pattern = input.to_string_lossy();
        if is_glob_pattern(&pattern) {
            files.extend(glob_matches(&pattern)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = glob_matches(&pattern)?;
    if matches.len() > 1 {
        let hint = "pass a single file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

/// Regular files matching `pattern`; an empty result is an error.
fn glob_matches(pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let mut matches = Vec::new();
    let paths = glob(pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
