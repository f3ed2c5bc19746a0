use clap::{Parser, Subcommand};
use h2p_lib::telemetry::LogFormat;
use h2p_lib::{OutputMode, BROWSERS_PATH_ENV};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "h2p")]
#[command(
    version,
    about = "HTML to PDF - Render HTML through headless Chromium",
    long_about = "HTML to PDF (h2p)\n\nModes:\n- serve: HTTP server with GET /health and POST /convert.\n- convert: one-shot conversion of a file or stdin.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "compact",
        help = "Log line format"
    )]
    pub log_format: LogFormat,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for host/port/browser paths/timeouts; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct BrowserArgs {
    #[arg(
        long,
        global = true,
        env = BROWSERS_PATH_ENV,
        value_name = "PATH",
        help = "Directory containing chromium-* browser builds"
    )]
    pub browsers_path: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "CHROME_PATH",
        value_name = "PATH",
        help = "Browser executable to launch (skips discovery)"
    )]
    pub chrome_path: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Timeout (seconds) for loading HTML content"
    )]
    pub nav_timeout: Option<u64>,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Timeout (seconds) for waiting for network idle"
    )]
    pub network_idle_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long, help = "Listen address (default 0.0.0.0)")]
        host: Option<String>,

        #[arg(long, env = "PORT", help = "Listen port (default 3000)")]
        port: Option<u16>,
    },
    /// Convert a single HTML document
    Convert {
        #[arg(
            long,
            short,
            default_value = "-",
            help = "HTML file to convert ('-' reads stdin)"
        )]
        input: String,

        #[arg(
            long,
            value_parser = parse_output_mode,
            help = "Body encoding: base64 or compress (unrecognized values use base64)"
        )]
        output_mode: Option<OutputMode>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,

        #[arg(
            long,
            help = "Write the raw PDF instead of the JSON {statusCode, body} envelope"
        )]
        raw: bool,
    },
}

/// Lenient like the HTTP `outputMode` field: unknown modes fall back to base64.
fn parse_output_mode(value: &str) -> Result<OutputMode, std::convert::Infallible> {
    Ok(OutputMode::from(value))
}

pub fn parse() -> Cli {
    Cli::parse()
}
