// Launcher: start a CLI inside a new terminal window, positioned in a working dir
// Fire-and-forget: the terminal process is never waited on

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Terminal program the user picked in preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalKind {
    WindowsTerminal,
    PowerShell,
    Pwsh,
    Cmd,
    /// macOS Terminal.app, driven through AppleScript
    MacTerminal,
    /// Debian-style alternative pointing at the desktop's terminal
    XTerminalEmulator,
    GnomeTerminal,
    /// Any other program, driven as a POSIX shell with `-c` and no window of its own
    Shell(String),
}

impl TerminalKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "wt" => Self::WindowsTerminal,
            "powershell" => Self::PowerShell,
            "pwsh" => Self::Pwsh,
            "cmd" => Self::Cmd,
            "terminal" | "Terminal" => Self::MacTerminal,
            "x-terminal-emulator" => Self::XTerminalEmulator,
            "gnome-terminal" => Self::GnomeTerminal,
            other => Self::Shell(other.to_string()),
        }
    }

    pub fn program(&self) -> &str {
        match self {
            Self::WindowsTerminal => "wt",
            Self::PowerShell => "powershell",
            Self::Pwsh => "pwsh",
            Self::Cmd => "cmd",
            Self::MacTerminal => "osascript",
            Self::XTerminalEmulator => "x-terminal-emulator",
            Self::GnomeTerminal => "gnome-terminal",
            Self::Shell(program) => program,
        }
    }
}

/// CLI started inside the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliTarget {
    Claude,
    Droid,
}

impl CliTarget {
    pub fn command(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Droid => "droid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
}

/// Variables set on the terminal process only, e.g. the active droid key
pub type LaunchEnv = Vec<(String, String)>;

fn powershellQuote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn posixQuote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn applescriptQuote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', r"\\").replace('"', r#"\""#))
}

/// `cd` then the CLI; the shell stays open once the CLI exits
fn posixSession(workingDir: &str, cli: &str) -> String {
    format!("cd {} && {}; exec bash", posixQuote(workingDir), cli)
}

/// Program + args that open `kind` in `workingDir` running `target`
pub fn buildLaunchPlan(kind: &TerminalKind, workingDir: &str, target: CliTarget) -> LaunchPlan {
    let cli = target.command();
    let (program, args): (&str, Vec<String>) = match kind {
        TerminalKind::WindowsTerminal => (
            "wt",
            vec!["-d".into(), workingDir.into(), "pwsh".into(), "-NoExit".into(), "-Command".into(), cli.into()],
        ),
        TerminalKind::PowerShell | TerminalKind::Pwsh => (
            kind.program(),
            vec![
                "-NoExit".into(),
                "-Command".into(),
                format!("Set-Location -LiteralPath {}; {}", powershellQuote(workingDir), cli),
            ],
        ),
        TerminalKind::Cmd => ("cmd", vec!["/K".into(), format!("cd /d \"{}\" && {}", workingDir, cli)]),
        TerminalKind::MacTerminal => (
            "osascript",
            vec![
                "-e".into(),
                format!(
                    "tell application \"Terminal\" to do script {}",
                    applescriptQuote(&format!("cd {} && {}", posixQuote(workingDir), cli))
                ),
                "-e".into(),
                "tell application \"Terminal\" to activate".into(),
            ],
        ),
        TerminalKind::XTerminalEmulator => (
            "x-terminal-emulator",
            vec!["-e".into(), "bash".into(), "-c".into(), posixSession(workingDir, cli)],
        ),
        TerminalKind::GnomeTerminal => (
            "gnome-terminal",
            vec!["--".into(), "bash".into(), "-c".into(), posixSession(workingDir, cli)],
        ),
        TerminalKind::Shell(program) => (
            program.as_str(),
            vec!["-c".into(), format!("cd {} && {}", posixQuote(workingDir), cli)],
        ),
    };

    LaunchPlan { program: program.to_string(), args }
}

/// On Windows every terminal is opened through `cmd /C start` so it gets its own console
pub fn wrapForPlatform(plan: LaunchPlan) -> LaunchPlan {
    if !cfg!(target_os = "windows") {
        return plan;
    }
    let mut args = vec!["/C".to_string(), "start".to_string(), plan.program];
    args.extend(plan.args);
    LaunchPlan { program: "cmd".to_string(), args }
}

/// Ask the host's command lookup (`where` / `which`) for `program`
pub fn isCommandInstalled(program: &str) -> bool {
    let finder = if cfg!(target_os = "windows") { "where" } else { "which" };
    let mut cmd = Command::new(finder);
    cmd.arg(program).stdin(Stdio::null()).stderr(Stdio::null());
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);

    match cmd.output() {
        Ok(output) => output.status.success() && !output.stdout.is_empty(),
        Err(e) => {
            warn!("[isCommandInstalled] {} failed: {}", finder, e);
            false
        }
    }
}

/// Optional terminals are probed; the Windows built-ins and custom shells are assumed present
pub fn isTerminalAvailable(kind: &TerminalKind) -> bool {
    match kind {
        TerminalKind::WindowsTerminal
        | TerminalKind::MacTerminal
        | TerminalKind::XTerminalEmulator
        | TerminalKind::GnomeTerminal => isCommandInstalled(kind.program()),
        _ => true,
    }
}

fn notInstalledMessage(kind: &TerminalKind) -> String {
    match kind {
        TerminalKind::WindowsTerminal => {
            "Windows Terminal (install it from the Microsoft Store or pick another terminal)".to_string()
        }
        other => other.program().to_string(),
    }
}

pub fn launch(kind: &TerminalKind, workingDir: &Path, target: CliTarget, env: &LaunchEnv) -> AppResult<()> {
    if !isTerminalAvailable(kind) {
        return Err(AppError::TerminalNotInstalled(notInstalledMessage(kind)));
    }

    let dir = workingDir.to_string_lossy();
    let plan = wrapForPlatform(buildLaunchPlan(kind, &dir, target));
    info!("[launch] {} {:?} (+{} env vars)", plan.program, plan.args, env.len());

    let mut cmd = Command::new(&plan.program);
    cmd.args(&plan.args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);

    cmd.spawn().map_err(|e| AppError::Spawn { program: plan.program.clone(), source: e })?;
    Ok(())
}
