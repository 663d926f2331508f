//! Opening a file at a line in the developer's editor.
//!
//! Launching is fire-and-forget: failures are logged and never reach the caller.

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use tracing::{error, info};

/// Environment variable that overrides the configured editor.
pub const EDITOR_ENV: &str = "COMPONENT_REF_EDITOR";
pub const DEFAULT_EDITOR: &str = "code";

/// Editors that understand `-g file:line`.
const VSCODE_FAMILY: &[&str] = &[
    "cursor",
    "cursor-nightly",
    "code",
    "code-insiders",
    "antigravity",
    "agy",
];

const JETBRAINS: &[&str] = &[
    "idea", "webstorm", "phpstorm", "pycharm", "clion", "goland", "rustrover", "rider",
];

const TERMINAL_EDITORS: &[&str] = &["vi", "vim", "nvim", "emacs", "nano"];

/// Caller-supplied replacement for command-based launching.
#[derive(Clone)]
pub struct EditorCallback(Arc<dyn Fn(&Path, u32) + Send + Sync>);

impl EditorCallback {
    pub fn new(f: impl Fn(&Path, u32) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for EditorCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EditorCallback(..)")
    }
}

/// Resolved editor choice: an editor name or command template, plus an optional callback.
#[derive(Debug, Clone)]
pub struct EditorSetting {
    pub preference: String,
    pub callback: Option<EditorCallback>,
}

/// How a launch will be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// Full command line run through the platform shell.
    Shell(String),
    /// Editor binary started directly with "open at line" arguments.
    Direct { program: String, args: Vec<String> },
}

impl LaunchPlan {
    fn command(&self) -> Command {
        match self {
            LaunchPlan::Shell(line) => {
                let mut cmd = if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C");
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c");
                    c
                };
                cmd.arg(line);
                cmd
            }
            LaunchPlan::Direct { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
        }
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchPlan::Shell(line) => f.write_str(line),
            LaunchPlan::Direct { program, args } => write!(f, "{program} {}", args.join(" ")),
        }
    }
}

/// Decide how to open `file` at `line` for an editor name or template.
pub fn plan_launch(preference: &str, file: &Path, line: u32) -> LaunchPlan {
    let template = if VSCODE_FAMILY.contains(&preference) {
        format!("{preference} -g \"{{file}}\":{{line}}")
    } else {
        preference.to_string()
    };

    let file = file.display().to_string();
    if template.contains("{file}") || template.contains("{line}") {
        let command = template
            .replacen("{file}", &file, 1)
            .replacen("{line}", &line.to_string(), 1);
        let quoted = format!("\"{file}\"");
        let command = if command.contains(&quoted) {
            command
        } else {
            command.replacen(&file, &quoted, 1)
        };
        return LaunchPlan::Shell(command);
    }

    generic_plan(preference, &file, line)
}

fn generic_plan(editor: &str, file: &str, line: u32) -> LaunchPlan {
    let name = Path::new(editor)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(editor)
        .to_ascii_lowercase();

    let args = if TERMINAL_EDITORS.contains(&name.as_str()) {
        vec![format!("+{line}"), file.to_string()]
    } else if JETBRAINS.contains(&name.as_str()) {
        vec!["--line".to_string(), line.to_string(), file.to_string()]
    } else {
        vec![format!("{file}:{line}")]
    };
    LaunchPlan::Direct {
        program: editor.to_string(),
        args,
    }
}

#[derive(Debug, Clone)]
pub struct EditorLauncher {
    setting: EditorSetting,
}

impl EditorLauncher {
    pub fn new(setting: EditorSetting) -> Self {
        Self { setting }
    }

    /// Open `file` at `line`. Returns once the launch has been dispatched.
    pub fn open(&self, file: &Path, line: u32) {
        if let Some(callback) = &self.setting.callback {
            (callback.0)(file, line);
            return;
        }

        let plan = plan_launch(&self.setting.preference, file, line);
        info!(command = %plan, "opening editor");
        match plan.command().spawn() {
            Ok(mut child) => {
                // Reap in the background so a failing editor is still reported.
                std::thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        error!(command = %plan, %status, "[ComponentRefTagger] Command failed")
                    }
                    Err(e) => error!(command = %plan, error = %e, "[ComponentRefTagger] Command failed"),
                    Ok(_) => {}
                });
            }
            Err(e) => error!(command = %plan, error = %e, "[ComponentRefTagger] Error launching editor"),
        }
    }
}
