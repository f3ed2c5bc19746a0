//! Launch configuration resolution.
//!
//! Everything here is a pure function of the platform and the filesystem, so
//! the argument set and executable choice can be tested without starting a
//! browser.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Flags every launch gets. They keep Chromium stable inside containers and
/// serverless sandboxes.
const BASE_ARGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
];

/// Extra flags for memory-constrained ARM64 hosts.
const ARM64_ARGS: &[&str] = &[
    "--memory-pressure-off",
    "--max_old_space_size=1024",
    "--single-process",
];

/// Directory name prefix of a bundled browser build.
const BROWSER_DIR_PREFIX: &str = "chromium";

/// Candidate executables inside a bundled build, in probe order.
const EXECUTABLE_CANDIDATES: &[&str] = &[
    "chrome-linux/headless_shell",
    "chrome-linux/chrome",
    "chrome-linux/chromium",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
    Other,
}

impl Arch {
    pub fn from_target(arch: &str) -> Self {
        match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            _ => Arch::Other,
        }
    }

    fn is_memory_constrained(self) -> bool {
        matches!(self, Arch::Aarch64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: Arch,
}

impl Platform {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: Arch::from_target(std::env::consts::ARCH),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arch = match self.arch {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
            Arch::Other => "other",
        };
        write!(f, "{}/{}", self.os, arch)
    }
}

/// Compute the browser argument set for a platform.
pub fn launch_args(platform: &Platform) -> Vec<String> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();
    if platform.arch.is_memory_constrained() {
        args.extend(ARM64_ARGS.iter().map(|a| a.to_string()));
    }
    args
}

/// Scan `root` for a `chromium*` build and return the first candidate
/// executable that exists. Unreadable roots yield `None`.
pub fn find_browser_executable(root: &Path) -> Option<PathBuf> {
    info!(path = %root.display(), "looking for browser build");

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %root.display(), error = %err, "cannot read browsers path");
            return None;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    debug!(contents = ?names, "browsers path contents");

    let browser_dirs: Vec<&String> = names
        .iter()
        .filter(|name| name.starts_with(BROWSER_DIR_PREFIX))
        .collect();
    debug!(dirs = ?browser_dirs, "candidate browser directories");

    for dir in browser_dirs {
        for candidate in EXECUTABLE_CANDIDATES {
            let path = root.join(dir).join(candidate);
            if path.is_file() {
                info!(executable = %path.display(), "found browser executable");
                return Some(path);
            }
        }
    }

    None
}

/// Inputs for resolving a [`LaunchPlan`].
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub platform: Platform,
    pub browsers_path: Option<PathBuf>,
    pub chrome_path: Option<PathBuf>,
    pub launch_timeout: Duration,
    /// Upper bound for a single CDP request.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            browsers_path: None,
            chrome_path: None,
            launch_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Fully resolved launch parameters handed to a browser backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub args: Vec<String>,
    /// `None` lets the backend use its default discovery.
    pub executable: Option<PathBuf>,
    pub launch_timeout: Duration,
    pub request_timeout: Duration,
}

impl LaunchPlan {
    pub fn resolve(options: &LaunchOptions) -> Self {
        let executable = options.chrome_path.clone().or_else(|| {
            options
                .browsers_path
                .as_deref()
                .and_then(find_browser_executable)
        });
        if executable.is_none() && options.browsers_path.is_some() {
            warn!("no bundled browser found; falling back to default discovery");
        }

        Self {
            args: launch_args(&options.platform),
            executable,
            launch_timeout: options.launch_timeout,
            request_timeout: options.request_timeout,
        }
    }
}
