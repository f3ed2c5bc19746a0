use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use h2p_lib::{ConvertRequest, H2pError, OutputMode};
use tracing::{debug, info};

use crate::cli::BrowserArgs;
use crate::formatting::{render_error, write_bytes, write_envelope};
use crate::settings::{format_effective_config, load_config, resolve_config};

use super::build_converter;

/// Convert one HTML document from a file or stdin.
pub async fn run_convert(
    config_path: Option<PathBuf>,
    browser: &BrowserArgs,
    input: String,
    output_mode: Option<OutputMode>,
    output: Option<PathBuf>,
    raw: bool,
) -> ExitCode {
    let config = match load_config(config_path.as_deref())
        .and_then(|cfg| resolve_config(cfg, browser, None, None))
    {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err),
    };
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let html = match read_input(&input) {
        Ok(html) => html,
        Err(err) => return render_error(err),
    };
    info!(input = %input, bytes = html.len(), "converting document");

    let converter = build_converter(&config);
    let code = if raw {
        match converter.renderer().render(&html).await {
            Ok(pdf) => match write_bytes(&pdf, output.as_deref()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => render_error(err),
            },
            Err(err) => render_error(err),
        }
    } else {
        let mut request = ConvertRequest::new(html);
        request.output_mode = output_mode;
        let envelope = converter.handle(&request).await;
        match write_envelope(&envelope, output.as_deref()) {
            Ok(()) if envelope.is_success() => ExitCode::SUCCESS,
            Ok(()) => ExitCode::from(1),
            Err(err) => render_error(err),
        }
    };

    converter.renderer().manager().shutdown().await;
    code
}

fn read_input(input: &str) -> Result<String, H2pError> {
    if input == "-" {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        Ok(html)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}
