use clap::Parser;
use env_logger::Builder;
use env_logger::Env;
use log::{error, Level};
use std::io::Write;

use aquatherm::analysis::run_analysis;
use aquatherm::color_utils::{colors, init_color_config, symbols};
use aquatherm::config::{AnalyzeCommand, AnalyzeConfig, GlobalArgs, DEFAULT_MODEL_PATH};
use aquatherm::error::AnalyzeError;
use aquatherm::image_source::TILE_CACHE_ENV_VAR;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Estimate urban heat risk from an image or a cached satellite tile
    Analyze(AnalyzeCommand),

    /// Show version information
    Version,
}

#[derive(Parser)]
#[command(name = "aquatherm")]
#[command(about = "Plastic pollution and urban heat risk analysis")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn get_log_level_from_verbosity(
    verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::ErrorLevel>,
) -> log::LevelFilter {
    let adjusted_level = match verbosity.log_level_filter() {
        log::LevelFilter::Off => log::LevelFilter::Off, // -qq
        log::LevelFilter::Error => log::LevelFilter::Warn, // default
        log::LevelFilter::Warn => log::LevelFilter::Info, // -v
        log::LevelFilter::Info => log::LevelFilter::Debug, // -vv
        log::LevelFilter::Debug | log::LevelFilter::Trace => log::LevelFilter::Trace,
    };

    // -q lands on Off with the ErrorLevel default; keep errors visible
    if verbosity.is_silent() {
        log::LevelFilter::Error
    } else {
        adjusted_level
    }
}

fn init_logging(global: &GlobalArgs) {
    // Without -v/-q, honor RUST_LOG when it is set
    let use_env = !global.verbosity.is_present() && std::env::var_os("RUST_LOG").is_some();

    let mut logger = if use_env {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(get_log_level_from_verbosity(global.verbosity.clone()));
        b
    };

    logger
        .format(|buf, record| {
            let level_str = match record.level() {
                Level::Error => colors::error_level("ERROR"),
                Level::Warn => colors::warning_level("WARN"),
                Level::Info => colors::info_level("INFO"),
                Level::Debug => colors::debug_level("DEBUG"),
                Level::Trace => colors::trace_level("TRACE"),
            };
            writeln!(buf, "[{}] {}", level_str, record.args())
        })
        .init();
}

/// Print the error body on stdout, where a response would have gone.
fn report_failure(err: &AnalyzeError) -> ! {
    error!("{}Analysis failed: {err:#}", symbols::operation_failed());
    match serde_json::to_string_pretty(&err.to_response()) {
        Ok(body) => println!("{body}"),
        Err(e) => error!("Failed to serialize error response: {e}"),
    }
    std::process::exit(err.exit_code());
}

fn main() {
    let cli = Cli::parse();

    init_color_config(cli.global.no_color);
    init_logging(&cli.global);

    match cli.command {
        Some(Commands::Analyze(cmd)) => {
            let config = match AnalyzeConfig::from_args(cli.global.clone(), cmd) {
                Ok(config) => config,
                Err(e) => report_failure(&e),
            };
            let stdout = std::io::stdout();
            if let Err(e) = run_analysis(config, &mut stdout.lock()) {
                report_failure(&e);
            }
        }
        Some(Commands::Version) => {
            println!("aquatherm v{}", env!("CARGO_PKG_VERSION"));
            println!("Default model: {DEFAULT_MODEL_PATH}");
            println!("Tile cache override: {TILE_CACHE_ENV_VAR}");
        }
        None => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            if let Err(e) = cmd.print_help() {
                error!("Failed to print help: {e}");
            }
        }
    }
}
