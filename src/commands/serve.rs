use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use h2p_lib::{server, H2pError};
use tracing::{debug, error};

use crate::cli::BrowserArgs;
use crate::formatting::render_error;
use crate::settings::{format_effective_config, load_config, resolve_config};

use super::build_converter;

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_serve(
    config_path: Option<PathBuf>,
    browser: &BrowserArgs,
    host: Option<String>,
    port: Option<u16>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref())
        .and_then(|cfg| resolve_config(cfg, browser, host, port))
    {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err),
    };
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let ip: IpAddr = match config.host.parse() {
        Ok(ip) => ip,
        Err(_) => {
            return render_error(H2pError::Config(format!(
                "invalid listen host: {}",
                config.host
            )))
        }
    };
    let addr = SocketAddr::new(ip, config.port);

    match server::serve(build_converter(&config), addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server exited with error");
            render_error(err)
        }
    }
}
