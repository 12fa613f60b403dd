use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use pcapglance_core::{
    CaptureFile, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_PACKETS, DEFAULT_PREVIEW_BYTES,
    DecodeOptions, ExportFormat, RenderOptions, SourceError, SourceOptions, read_capture_file,
    render,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("PCAPGLANCE_BUILD_COMMIT"),
    ", ",
    env!("PCAPGLANCE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  pcapglance pcap summarize capture.pcap -o summary.json\n  pcapglance pcap summarise capture.pcap --stdout --format markdown\n  pcapglance pcap summarize 'captures/*.pcap' -o summary.csv --format csv";

#[derive(Parser, Debug)]
#[command(name = "pcapglance")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Summarize classic libpcap capture files: header fields and a per-packet preview.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on classic PCAP inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode a capture file and write its summary.
    #[command(alias = "summarise")]
    #[command(after_help = EXAMPLES)]
    Summarize(SummarizeArgs),
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// Path (or glob matching exactly one file) to a .pcap or .cap file
    input: PathBuf,

    /// Output path for the summary
    #[arg(short = 'o', long = "output", required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write the summary to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Packet records kept before the summary is cut short
    #[arg(long, default_value_t = DEFAULT_MAX_PACKETS)]
    max_packets: usize,

    /// Leading payload bytes shown per packet
    #[arg(long, default_value_t = DEFAULT_PREVIEW_BYTES)]
    preview_bytes: usize,

    /// Refuse input files larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_BYTES)]
    max_file_size: u64,

    /// Exit with a non-zero code if the capture was truncated or hit the packet limit
    #[arg(long)]
    fail_on_truncation: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

impl From<OutputFormat> for ExportFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Markdown => ExportFormat::Markdown,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Summarize(args) => {
                init_logging(cli.verbose, args.quiet);
                cmd_pcap_summarize(args)
            }
        },
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

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
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

impl From<SourceError> for CliError {
    fn from(err: SourceError) -> Self {
        let hint = match &err {
            SourceError::Io(_) => None,
            SourceError::TooLarge { .. } => {
                Some("raise the limit with --max-file-size".to_string())
            }
            SourceError::Pcapng => {
                Some("convert it first, e.g. `editcap -F pcap in.pcapng out.pcap`".to_string())
            }
            SourceError::Decode(_) => Some("expected a classic libpcap (.pcap) file".to_string()),
        };
        CliError::new(format!("failed to read capture: {err}"), hint)
    }
}

enum Destination {
    Stdout,
    File(PathBuf),
}

fn cmd_pcap_summarize(args: SummarizeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", args.input.display()),
            Some("use a .pcap file".to_string()),
        ));
    }

    let destination = match (args.stdout, args.output) {
        (true, _) => Destination::Stdout,
        (false, Some(path)) => {
            ensure_distinct_output(&resolved_input, &path)?;
            Destination::File(path)
        }
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            ));
        }
    };

    if args.pretty && args.format != OutputFormat::Json {
        warn!(format = ?args.format, "--pretty only affects JSON output");
    }

    let options = SourceOptions {
        max_file_bytes: args.max_file_size,
        decode: DecodeOptions {
            max_packets: args.max_packets,
            preview_bytes: args.preview_bytes,
        },
    };
    let capture = read_capture_file(&resolved_input, &options)?;
    info!(
        input = %resolved_input.display(),
        packets = capture.packet_count(),
        truncated = capture.is_truncated(),
        limit_reached = capture.limit_reached(),
        "capture decoded"
    );

    let rendered = render(
        &capture,
        args.format.into(),
        &RenderOptions {
            pretty: args.pretty,
        },
    )
    .context("rendering summary failed")?;

    match destination {
        Destination::Stdout => print!("{}", rendered),
        Destination::File(path) => {
            write_output(&path, &rendered)?;
            if !args.quiet {
                eprintln!("OK: summary written -> {}", path.display());
            }
        }
    }

    if args.fail_on_truncation {
        check_truncation(&capture)?;
    }
    Ok(())
}

fn check_truncation(capture: &CaptureFile) -> Result<(), CliError> {
    if capture.is_truncated() {
        return Err(CliError::new(
            "capture ends in a truncated packet record",
            Some("the file is incomplete or corrupt".to_string()),
        ));
    }
    if let Some(marker) = capture.limit_marker() {
        return Err(CliError::new(
            format!("capture exceeds the {} packet limit", marker.limit),
            Some("raise the limit with --max-packets".to_string()),
        ));
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(())
}

fn ensure_distinct_output(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Some(parent) = output.parent() else {
        return Ok(());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    // A missing parent will be created later, so it cannot hold the input.
    let Ok(parent_abs) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if parent_abs.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "pcap" | "cap" => Ok(()),
        "pcapng" => Err(CliError::new(
            format!("pcapng input is not supported: {}", input.display()),
            Some("convert it first, e.g. `editcap -F pcap in.pcapng out.pcap`".to_string()),
        )),
        _ => Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .cap file".to_string()),
        )),
    }
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
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

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .pcap file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
