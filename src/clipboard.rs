use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write to {program}: {source}")]
    Write {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit {
        program: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

const NO_ARGS: &[&str] = &[];
const XCLIP_ARGS: &[&str] = &["-selection", "clipboard"];

/// Destination for copied text.
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard, reached through the platform's copy utility:
/// pbcopy on macOS, wl-copy on Wayland, xclip on X11, clip on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn command() -> Result<(&'static str, &'static [&'static str]), ClipboardError> {
        if cfg!(target_os = "macos") {
            Ok(("pbcopy", NO_ARGS))
        } else if cfg!(target_os = "windows") {
            Ok(("clip", NO_ARGS))
        } else if cfg!(unix) {
            let session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();
            if session_type == "wayland" {
                Ok(("wl-copy", NO_ARGS))
            } else {
                Ok(("xclip", XCLIP_ARGS))
            }
        } else {
            Err(ClipboardError::Unavailable(
                "no clipboard utility for this platform".into(),
            ))
        }
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args) = Self::command()?;
        pipe_to(program, args, text)
    }
}

fn pipe_to(program: &'static str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| ClipboardError::Spawn { program, source })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|source| ClipboardError::Write { program, source })?;
    }

    let status = child
        .wait()
        .map_err(|source| ClipboardError::Write { program, source })?;
    if !status.success() {
        return Err(ClipboardError::Exit { program, status });
    }

    log::info!("Copied {} bytes with {program}", text.len());
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = pipe_to("ocr-desk-no-such-clipboard-tool", NO_ARGS, "x").unwrap_err();
        assert!(matches!(err, ClipboardError::Spawn { .. }));
        assert!(err.to_string().contains("ocr-desk-no-such-clipboard-tool"));
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let err = pipe_to("false", NO_ARGS, "").unwrap_err();
        assert!(matches!(err, ClipboardError::Exit { program: "false", .. }));
    }

    #[test]
    fn text_is_piped_to_stdin() {
        assert!(pipe_to("cat", NO_ARGS, "hello").is_ok());
    }
}
