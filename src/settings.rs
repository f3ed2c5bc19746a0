use std::path::Path;
use std::time::Duration;

use h2p_lib::{Config, H2pError, LaunchOptions, PageWait, Platform};

use crate::cli::BrowserArgs;

/// Merge CLI arguments into the loaded config, preferring CLI values when present.
pub fn resolve_config(
    mut config: Config,
    browser: &BrowserArgs,
    host: Option<String>,
    port: Option<u16>,
) -> Result<Config, H2pError> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if browser.browsers_path.is_some() {
        config.browsers_path = browser.browsers_path.clone();
    }
    if browser.chrome_path.is_some() {
        config.chrome_path = browser.chrome_path.clone();
    }
    if let Some(secs) = browser.nav_timeout {
        config.timeouts.navigation = Duration::from_secs(secs);
    }
    if let Some(secs) = browser.network_idle_timeout {
        config.timeouts.network_idle = Duration::from_secs(secs);
    }
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file or return defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, H2pError> {
    Config::load(path)
}

pub fn launch_options(config: &Config) -> LaunchOptions {
    LaunchOptions {
        platform: Platform::current(),
        browsers_path: config.browsers_path.clone(),
        chrome_path: config.chrome_path.clone(),
        launch_timeout: config.timeouts.launch,
        request_timeout: config.timeouts.navigation,
    }
}

pub fn page_wait(config: &Config) -> PageWait {
    PageWait {
        navigation_timeout: config.timeouts.navigation,
        network_idle_timeout: config.timeouts.network_idle,
        idle_threshold: config.timeouts.idle_threshold,
    }
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let path_or = |p: &Option<std::path::PathBuf>, fallback: &str| {
        p.as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| fallback.to_string())
    };
    format!(
        "Effective config [{source}]: listen={}:{}, browsers_path={}, chrome_path={}, timeouts: nav={}s, network-idle={}s, idle-threshold={}ms, launch={}s",
        config.host,
        config.port,
        path_or(&config.browsers_path, "none"),
        path_or(&config.chrome_path, "auto"),
        config.timeouts.navigation.as_secs(),
        config.timeouts.network_idle.as_secs(),
        config.timeouts.idle_threshold.as_millis(),
        config.timeouts.launch.as_secs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn resolve_config_prefers_config_when_flags_absent() {
        let cfg = Config {
            port: 9000,
            browsers_path: Some(PathBuf::from("/opt/browsers")),
            ..Config::default()
        };
        let resolved = resolve_config(cfg, &BrowserArgs::default(), None, None).unwrap();

        assert_eq!(resolved.port, 9000);
        assert_eq!(resolved.browsers_path, Some(PathBuf::from("/opt/browsers")));
        assert_eq!(resolved.timeouts.navigation, Duration::from_secs(30));
    }

    #[test]
    fn resolve_config_prefers_cli_when_flags_present() {
        let cfg = Config {
            port: 9000,
            browsers_path: Some(PathBuf::from("/opt/browsers")),
            ..Config::default()
        };
        let args = BrowserArgs {
            browsers_path: Some(PathBuf::from("/srv/pw")),
            chrome_path: None,
            nav_timeout: Some(12),
            network_idle_timeout: Some(4),
        };
        let resolved =
            resolve_config(cfg, &args, Some("127.0.0.1".to_string()), Some(8080)).unwrap();

        assert_eq!(resolved.host, "127.0.0.1");
        assert_eq!(resolved.port, 8080);
        assert_eq!(resolved.browsers_path, Some(PathBuf::from("/srv/pw")));
        assert_eq!(resolved.timeouts.navigation, Duration::from_secs(12));
        assert_eq!(resolved.timeouts.network_idle, Duration::from_secs(4));

        let wait = page_wait(&resolved);
        assert_eq!(wait.network_idle_timeout, Duration::from_secs(4));
        let launch = launch_options(&resolved);
        assert_eq!(launch.browsers_path, Some(PathBuf::from("/srv/pw")));
    }

    #[test]
    fn resolve_config_rejects_zero_timeout_flag() {
        let args = BrowserArgs {
            nav_timeout: Some(0),
            ..BrowserArgs::default()
        };
        assert!(resolve_config(Config::default(), &args, None, None).is_err());
    }

    #[test]
    fn format_effective_config_includes_all_fields() {
        let summary = format_effective_config(&Config::default(), Some(Path::new("h2p.toml")));
        assert!(summary.contains("listen=0.0.0.0:3000"));
        assert!(summary.contains("browsers_path=none"));
        assert!(summary.contains("chrome_path=auto"));
        assert!(summary.contains("nav=30s"));
        assert!(summary.contains("network-idle=10s"));
        assert!(summary.contains("idle-threshold=500ms"));
        assert!(summary.contains("h2p.toml"));
    }
}
