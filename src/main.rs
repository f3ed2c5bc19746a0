mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_convert, run_serve};
use formatting::render_error;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = h2p_lib::telemetry::init(args.verbose, args.log_format) {
        return render_error(err);
    }

    match args.command {
        Commands::Serve { host, port } => run_serve(args.config, &args.browser, host, port).await,
        Commands::Convert {
            input,
            output_mode,
            output,
            raw,
        } => run_convert(args.config, &args.browser, input, output_mode, output, raw).await,
    }
}
