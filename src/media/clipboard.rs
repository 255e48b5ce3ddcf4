// SPDX-License-Identifier: GPL-3.0-only

//! System clipboard access
//!
//! There is no clipboard API in the standard library, so reads and writes go
//! through the usual desktop helpers (`wl-paste`/`wl-copy` on Wayland,
//! `xclip`/`xsel` on X11, `pbcopy` on macOS). Each helper is tried in turn.

use crate::errors::AppError;
use crate::media::ClipboardItem;
use futures::future::BoxFuture;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Reads the typed items currently on the clipboard
pub trait ClipboardReader: Send + Sync {
    fn read_items(&self) -> BoxFuture<'static, Result<Vec<ClipboardItem>, AppError>>;
}

/// Writes plain text to the clipboard
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), AppError>>;
}

/// Copy helpers in the order they are tried
const COPY_HELPERS: [&[&str]; 4] = [
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["pbcopy"],
];

/// Clipboard backed by desktop command-line helpers
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard {
    /// Copy command overriding the built-in helpers, e.g. `["wl-copy"]`
    copy_command: Option<Vec<String>>,
}

impl SystemClipboard {
    pub fn new(copy_command: Option<String>) -> Self {
        let copy_command = copy_command
            .map(|cmd| cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|argv| !argv.is_empty());
        Self { copy_command }
    }
}

impl ClipboardReader for SystemClipboard {
    fn read_items(&self) -> BoxFuture<'static, Result<Vec<ClipboardItem>, AppError>> {
        Box::pin(async move {
            // Method 1: Wayland
            if let Some(types) = run_capture("wl-paste", &["--list-types"]).await {
                debug!("Reading clipboard via wl-paste");
                return Ok(read_typed_items(parse_types(&types), |mime| {
                    ("wl-paste", vec!["--no-newline".to_string(), "--type".to_string(), mime])
                })
                .await);
            }

            // Method 2: X11
            if let Some(types) =
                run_capture("xclip", &["-selection", "clipboard", "-t", "TARGETS", "-o"]).await
            {
                debug!("Reading clipboard via xclip");
                return Ok(read_typed_items(parse_types(&types), |mime| {
                    (
                        "xclip",
                        vec![
                            "-selection".to_string(),
                            "clipboard".to_string(),
                            "-t".to_string(),
                            mime,
                            "-o".to_string(),
                        ],
                    )
                })
                .await);
            }

            // Method 3: macOS exposes text only
            if let Some(text) = run_capture("pbpaste", &[]).await {
                debug!("Reading clipboard via pbpaste");
                return Ok(vec![ClipboardItem::new("text/plain", text)]);
            }

            Err(AppError::Clipboard(
                "No clipboard helper found (tried wl-paste, xclip, pbpaste)".to_string(),
            ))
        })
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), AppError>> {
        let candidates: Vec<Vec<String>> = match &self.copy_command {
            Some(argv) => vec![argv.clone()],
            None => COPY_HELPERS
                .iter()
                .map(|argv| argv.iter().map(|s| s.to_string()).collect())
                .collect(),
        };

        Box::pin(async move {
            for argv in candidates {
                let Some((program, args)) = argv.split_first() else {
                    continue;
                };
                match pipe_to(program, args, text.as_bytes()).await {
                    Ok(()) => {
                        info!(helper = %program, len = text.len(), "Copied payload to clipboard");
                        return Ok(());
                    }
                    Err(e) => debug!(helper = %program, error = %e, "Clipboard helper failed"),
                }
            }
            Err(AppError::Clipboard("No clipboard helper accepted the text".to_string()))
        })
    }
}

/// Keep MIME types, dropping X11 atoms such as TARGETS or TIMESTAMP
fn parse_types(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(str::trim)
        .filter(|t| t.contains('/'))
        .map(str::to_string)
        .collect()
}

async fn read_typed_items<F>(types: Vec<String>, argv_for: F) -> Vec<ClipboardItem>
where
    F: Fn(String) -> (&'static str, Vec<String>),
{
    let mut items = Vec::with_capacity(types.len());
    for mime in types {
        let (program, args) = argv_for(mime.clone());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match run_capture(program, &args).await {
            Some(data) => items.push(ClipboardItem::new(mime, data)),
            None => warn!(mime = %mime, "Failed to read clipboard item"),
        }
    }
    items
}

/// Run a helper and return its stdout on success
async fn run_capture(program: &str, args: &[&str]) -> Option<Vec<u8>> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    output.status.success().then_some(output.stdout)
}

async fn pipe_to(program: &str, args: &[String], input: &[u8]) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input).await?;
        // Closing stdin lets the helper finish
        drop(stdin);
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{} exited with {}", program, status)))
    }
}
