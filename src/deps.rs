//! Dependency detection and installation.
//!
//! When yt-dlp or ffmpeg is missing, the host's package manager is detected
//! and an install plan is run step by step through the [`StepRunner`]. The
//! first failing step aborts the whole plan.

use crate::error::{Result, YtproError};
use crate::process::tool_available;
use crate::step::StepRunner;
use std::io::Write;
use tracing::{info, instrument};

const HOMEBREW_INSTALL: &str =
    "curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh | /bin/bash";

/// Tools the download flow needs.
pub const REQUIRED_TOOLS: &[&str] = &["yt-dlp", "ffmpeg"];

/// Linux package managers an install plan can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
}

/// The host as far as installation is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux(Option<PackageManager>),
    MacOs { has_brew: bool },
    Windows { has_winget: bool },
    Other(String),
}

impl Platform {
    /// Detect the running OS and its package manager.
    pub async fn detect() -> Self {
        let os = std::env::consts::OS;
        let candidates: &[&str] = match os {
            "linux" => &["apt", "dnf", "pacman"],
            "macos" => &["brew"],
            "windows" => &["winget"],
            _ => &[],
        };

        let mut found = Vec::new();
        for tool in candidates {
            if tool_available(tool).await {
                found.push(*tool);
            }
        }
        Self::detect_with(os, |name| found.iter().any(|t| *t == name))
    }

    /// Detection with an injectable OS name and tool probe.
    pub fn detect_with(os: &str, has: impl Fn(&str) -> bool) -> Self {
        match os {
            "linux" => {
                let pm = if has("apt") {
                    Some(PackageManager::Apt)
                } else if has("dnf") {
                    Some(PackageManager::Dnf)
                } else if has("pacman") {
                    Some(PackageManager::Pacman)
                } else {
                    None
                };
                Platform::Linux(pm)
            }
            "macos" => Platform::MacOs { has_brew: has("brew") },
            "windows" => Platform::Windows { has_winget: has("winget") },
            other => Platform::Other(other.to_string()),
        }
    }
}

/// One command in an install plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub label: &'static str,
    pub program: &'static str,
    pub args: Vec<&'static str>,
}

impl InstallStep {
    fn new(label: &'static str, program: &'static str, args: &[&'static str]) -> Self {
        Self {
            label,
            program,
            args: args.to_vec(),
        }
    }
}

/// Ordered steps that install both tools on `platform`.
pub fn install_plan(platform: &Platform) -> Result<Vec<InstallStep>> {
    let steps = match platform {
        Platform::Linux(Some(PackageManager::Apt)) => vec![
            InstallStep::new("Refreshing apt", "sudo", &["apt", "update", "-y"]),
            InstallStep::new(
                "Installing yt-dlp & ffmpeg",
                "sudo",
                &["apt", "install", "-y", "yt-dlp", "ffmpeg"],
            ),
        ],
        Platform::Linux(Some(PackageManager::Dnf)) => vec![InstallStep::new(
            "Installing yt-dlp & ffmpeg",
            "sudo",
            &["dnf", "install", "-y", "yt-dlp", "ffmpeg"],
        )],
        Platform::Linux(Some(PackageManager::Pacman)) => vec![
            InstallStep::new("Syncing pacman", "sudo", &["pacman", "-Sy", "--noconfirm"]),
            InstallStep::new(
                "Installing yt-dlp & ffmpeg",
                "sudo",
                &["pacman", "-S", "--noconfirm", "yt-dlp", "ffmpeg"],
            ),
        ],
        Platform::Linux(_) => {
            return Err(YtproError::UnsupportedPlatform(
                "no supported Linux package manager (apt, dnf, pacman)".to_string(),
            ))
        }
        Platform::MacOs { has_brew } => {
            let mut steps = Vec::new();
            if !has_brew {
                steps.push(InstallStep::new("Installing Homebrew", "/bin/bash", &["-c", HOMEBREW_INSTALL]));
            }
            steps.push(InstallStep::new("Installing yt-dlp", "brew", &["install", "yt-dlp"]));
            steps.push(InstallStep::new("Installing ffmpeg", "brew", &["install", "ffmpeg"]));
            steps
        }
        Platform::Windows { has_winget: false } => {
            return Err(YtproError::ToolNotFound("winget".to_string()))
        }
        Platform::Windows { has_winget: true } => vec![
            InstallStep::new(
                "Installing yt-dlp",
                "winget",
                &["install", "--id=yt-dlp.yt-dlp", "-e", "--accept-package-agreements", "--accept-source-agreements"],
            ),
            InstallStep::new(
                "Installing FFmpeg",
                "winget",
                &["install", "--id=Gyan.FFmpeg", "-e", "--accept-package-agreements", "--accept-source-agreements"],
            ),
        ],
        Platform::Other(os) => return Err(YtproError::UnsupportedPlatform(os.clone())),
    };
    Ok(steps)
}

/// Required tools that cannot be started.
pub async fn missing_tools() -> Vec<&'static str> {
    let mut missing = Vec::new();
    for tool in REQUIRED_TOOLS {
        if !tool_available(tool).await {
            missing.push(*tool);
        }
    }
    missing
}

/// Make sure the required tools exist, installing them if needed.
///
/// Returns `true` if an install plan was run.
#[instrument(skip_all)]
pub async fn ensure_tools<W: Write>(runner: &mut StepRunner<W>) -> Result<bool> {
    let missing = missing_tools().await;
    if missing.is_empty() {
        return Ok(false);
    }

    info!("Missing tools: {}", missing.join(", "));
    let platform = Platform::detect().await;
    run_plan(runner, &install_plan(&platform)?).await?;
    Ok(true)
}

/// Run each step in order; the first failure aborts the plan.
pub async fn run_plan<W: Write>(runner: &mut StepRunner<W>, steps: &[InstallStep]) -> Result<()> {
    for step in steps {
        runner.run(step.label, step.program, &step.args).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn only(tools: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |name| tools.iter().any(|t| *t == name)
    }

    #[test]
    fn test_detect_linux_package_manager_priority() {
        assert_eq!(
            Platform::detect_with("linux", only(&["pacman", "dnf"])),
            Platform::Linux(Some(PackageManager::Dnf))
        );
        assert_eq!(
            Platform::detect_with("linux", only(&["apt", "pacman"])),
            Platform::Linux(Some(PackageManager::Apt))
        );
        assert_eq!(Platform::detect_with("linux", only(&[])), Platform::Linux(None));
    }

    #[test]
    fn test_detect_other_platforms() {
        assert_eq!(
            Platform::detect_with("macos", only(&["brew"])),
            Platform::MacOs { has_brew: true }
        );
        assert_eq!(
            Platform::detect_with("windows", only(&[])),
            Platform::Windows { has_winget: false }
        );
        assert_eq!(
            Platform::detect_with("freebsd", only(&[])),
            Platform::Other("freebsd".into())
        );
    }

    #[test]
    fn test_apt_plan_refreshes_first() {
        let plan = install_plan(&Platform::Linux(Some(PackageManager::Apt))).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].args, vec!["apt", "update", "-y"]);
        assert!(plan[1].args.contains(&"yt-dlp"));
        assert!(plan.iter().all(|s| s.program == "sudo"));
    }

    #[test]
    fn test_macos_plan_installs_homebrew_only_when_missing() {
        let without = install_plan(&Platform::MacOs { has_brew: false }).unwrap();
        let with = install_plan(&Platform::MacOs { has_brew: true }).unwrap();
        assert_eq!(without.len(), 3);
        assert_eq!(without[0].label, "Installing Homebrew");
        assert_eq!(with.len(), 2);
        assert!(with.iter().all(|s| s.program == "brew"));
    }

    #[test]
    fn test_homebrew_installer_is_piped_into_bash() {
        let plan = install_plan(&Platform::MacOs { has_brew: false }).unwrap();
        let step = &plan[0];
        assert_eq!(step.program, "/bin/bash");
        assert_eq!(step.args[0], "-c");
        assert!(step.args[1].starts_with("curl -fsSL https://"));
        assert!(step.args[1].ends_with("| /bin/bash"));
        assert!(!step.args[1].contains("$("));
    }

    #[tokio::test]
    async fn test_detect_matches_running_os() {
        let platform = Platform::detect().await;
        match std::env::consts::OS {
            "linux" => assert!(matches!(platform, Platform::Linux(_))),
            "macos" => assert!(matches!(platform, Platform::MacOs { .. })),
            "windows" => assert!(matches!(platform, Platform::Windows { .. })),
            other => assert_eq!(platform, Platform::Other(other.to_string())),
        }
    }

    #[test]
    fn test_unsupported_platforms() {
        assert!(matches!(
            install_plan(&Platform::Linux(None)),
            Err(YtproError::UnsupportedPlatform(_))
        ));
        assert!(matches!(
            install_plan(&Platform::Windows { has_winget: false }),
            Err(YtproError::ToolNotFound(t)) if t == "winget"
        ));
        assert!(matches!(
            install_plan(&Platform::Other("plan9".into())),
            Err(YtproError::UnsupportedPlatform(os)) if os == "plan9"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_plan_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let steps = vec![
            InstallStep::new("First", "sh", &["-c", "echo ok"]),
            InstallStep::new("Second", "sh", &["-c", "echo broken >&2; exit 1"]),
            InstallStep::new("Third", "sh", &["-c", "echo third"]),
        ];
        let mut runner = StepRunner::with_output(dir.path(), Duration::from_millis(5), 15, Vec::new());

        let err = run_plan(&mut runner, &steps).await.unwrap_err();
        assert!(matches!(err, YtproError::StepFailed { ref step, .. } if step == "Second"));
        assert_eq!(runner.last_state(), Some(crate::step::StepState::Failed));

        let printed = String::from_utf8(runner.into_output()).unwrap();
        assert!(printed.contains("First"));
        assert!(printed.contains("broken"));
        assert!(!printed.contains("Third"));
    }
}
