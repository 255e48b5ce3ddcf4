// SPDX-License-Identifier: GPL-3.0-only

//! CLI front end
//!
//! Every command drives the same session model through a [`Runtime`]:
//! - Decoding a file, standard input or a picked file
//! - Decoding a clipboard paste
//! - Capturing and decoding one camera frame
//! - Listing cameras
//! - An interactive session reading commands from standard input

use qr_analyzer::app::frame_processor::PayloadKind;
use qr_analyzer::backends::camera::{CameraBackendType, CameraState, get_backend_for_type};
use qr_analyzer::constants::{camera as camera_consts, file_formats::IMAGE_EXTENSIONS};
use qr_analyzer::{AppModel, Config, Message, Runtime, Screen, Services, SourceImage, SourceOrigin};
use qr_analyzer::app::PasteResult;
use qr_analyzer::terminal::{self, PreviewExit};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::debug;

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

const HELP: &str = "\
Commands:
  open [PATH]   decode an image file (no path opens a file picker)
  paste         decode the image on the clipboard
  camera        open the camera (live preview on a terminal)
  capture       capture the current camera frame
  close         close the camera
  copy          copy the decoded text
  link          open the decoded link
  reset         scan another image
  status        show the current screen
  help          show this help
  quit          exit";

fn new_runtime(config: Config, capture_dir: Option<PathBuf>) -> Runtime {
    let services = Services::system(&config);
    Runtime::new(AppModel::new(config, services).with_capture_dir(capture_dir))
}

/// Print the final screen; the payload alone goes to stdout
fn report(model: &AppModel) -> ExitCode {
    match model.view() {
        Screen::Result { payload, .. } => {
            println!("{}", payload);
            ExitCode::SUCCESS
        }
        screen => {
            eprintln!("{}", screen);
            ExitCode::FAILURE
        }
    }
}

async fn pick_image() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Choose an image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Decode one image file, standard input, or a picked file
pub async fn decode(config: Config, path: Option<PathBuf>) -> CliResult {
    let message = match path {
        Some(path) if path.as_os_str() == "-" => {
            let mut bytes = Vec::new();
            tokio::io::stdin().read_to_end(&mut bytes).await?;
            Message::LoadSource(SourceImage::from_bytes(bytes, SourceOrigin::Stdin))
        }
        Some(path) => Message::SelectFile(path),
        None => match pick_image().await {
            Some(path) => Message::SelectFile(path),
            None => {
                eprintln!("No file selected.");
                return Ok(ExitCode::FAILURE);
            }
        },
    };

    let mut runtime = new_runtime(config, None);
    runtime.dispatch(message);
    runtime.settle().await;
    Ok(report(runtime.model()))
}

/// Decode the first image on the clipboard
pub async fn paste(config: Config) -> CliResult {
    let mut runtime = new_runtime(config, None);
    runtime.dispatch(Message::ReadClipboard);
    runtime.settle().await;

    if runtime.model().last_paste == Some(PasteResult::Unhandled) {
        eprintln!("No image on the clipboard.");
        return Ok(ExitCode::FAILURE);
    }
    Ok(report(runtime.model()))
}

/// Open the camera, wait for it to warm up, capture one frame and decode it
pub async fn camera(
    mut config: Config,
    device: Option<String>,
    backend: Option<CameraBackendType>,
    save: Option<PathBuf>,
) -> CliResult {
    if let Some(backend) = backend {
        config.camera_backend = backend;
    }
    if device.is_some() {
        config.camera_path = device;
    }
    let warmup = Duration::from_millis(config.camera_warmup_ms);

    let mut runtime = new_runtime(config, save);
    runtime.dispatch(Message::OpenCamera);
    runtime.settle().await;

    if let Some(view) = runtime.model().camera.view.as_ref()
        && view.state() == CameraState::Denied
    {
        eprintln!("{}", view.error_message().unwrap_or_default());
        if let Some(err) = view.error() {
            eprintln!("  {}", err);
        }
        return Ok(ExitCode::FAILURE);
    }

    tokio::time::sleep(warmup).await;

    for attempt in 1..=camera_consts::CAPTURE_ATTEMPTS {
        runtime.dispatch(Message::CaptureFrame);
        if runtime.model().camera.view.is_none() {
            break;
        }
        debug!(attempt, "No frame yet, retrying capture");
        tokio::time::sleep(camera_consts::CAPTURE_RETRY_INTERVAL).await;
    }

    if runtime.model().camera.view.is_some() {
        runtime.dispatch(Message::CloseCamera);
        eprintln!("The camera did not deliver a frame.");
        return Ok(ExitCode::FAILURE);
    }

    runtime.settle().await;
    if let Some(path) = &runtime.model().last_saved_capture {
        eprintln!("Saved capture to {}", path.display());
    }
    Ok(report(runtime.model()))
}

/// List all available cameras
pub fn list_cameras(config: Config) -> CliResult {
    let backend = get_backend_for_type(
        config.camera_backend,
        config.camera_path.as_ref().map(PathBuf::from),
    );

    if !backend.is_available() {
        println!("The {} backend is not available.", backend.backend_type());
        return Ok(ExitCode::FAILURE);
    }

    let cameras = backend.enumerate_cameras();
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        println!("  {} ({})", camera.name, camera.path);
        if let Some(driver) = &camera.driver {
            println!("      Driver: {}", driver);
        }

        let mut formats = backend.get_formats(camera);
        formats.sort_by(|a, b| (b.width * b.height).cmp(&(a.width * a.height)));
        formats.dedup();
        if !formats.is_empty() {
            let shown: Vec<String> = formats.iter().take(5).map(ToString::to_string).collect();
            println!("      Formats: {}", shown.join(", "));
        }
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

/// Interactive command
enum Command {
    Send(Message),
    Pick,
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let command = match word {
        "open" if arg.is_empty() => Command::Pick,
        "open" => Command::Send(Message::SelectFile(PathBuf::from(arg))),
        "paste" => Command::Send(Message::ReadClipboard),
        "camera" => Command::Send(Message::OpenCamera),
        "capture" => Command::Send(Message::CaptureFrame),
        "close" => Command::Send(Message::CloseCamera),
        "copy" => Command::Send(Message::CopyPayload),
        "link" => Command::Send(Message::OpenLink),
        "reset" => Command::Send(Message::Reset),
        "status" | "" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Prints the screen whenever it changes
#[derive(Default)]
struct ScreenPrinter {
    last: String,
}

impl ScreenPrinter {
    fn print(&mut self, model: &AppModel, force: bool) {
        let screen = model.view();
        let text = screen.to_string();
        if !force && text == self.last {
            return;
        }
        println!("{}", text);
        match screen {
            Screen::Result { kind, .. } => {
                let actions = match kind {
                    PayloadKind::Link => "copy, link, reset",
                    PayloadKind::Text => "copy, reset",
                };
                println!("({})", actions);
            }
            Screen::Error { .. } => println!("(reset)"),
            _ => {}
        }
        println!();
        self.last = text;
    }
}

/// Show the live preview of a streaming camera when stdout is a terminal
fn preview(runtime: &mut Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let streaming = runtime
        .model()
        .camera
        .view
        .as_ref()
        .is_some_and(|view| view.state() == CameraState::Streaming);
    if !streaming || !std::io::stdout().is_terminal() {
        return Ok(());
    }

    match terminal::run_preview(runtime)? {
        PreviewExit::Captured => debug!("Preview ended with a capture"),
        PreviewExit::Closed => debug!("Preview closed"),
    }
    Ok(())
}

/// Run an interactive session on standard input
pub async fn interactive(config: Config) -> CliResult {
    let mut runtime = new_runtime(config, None);
    let mut printer = ScreenPrinter::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    println!();
    printer.print(runtime.model(), true);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Send(Message::OpenCamera)) => {
                        runtime.dispatch(Message::OpenCamera);
                        runtime.settle().await;
                        preview(&mut runtime)?;
                    }
                    Some(Command::Send(message)) => runtime.dispatch(message),
                    Some(Command::Pick) => match pick_image().await {
                        Some(path) => runtime.dispatch(Message::SelectFile(path)),
                        None => println!("No file selected."),
                    },
                    Some(Command::Status) => printer.print(runtime.model(), true),
                    Some(Command::Help) => println!("{}", HELP),
                    Some(Command::Quit) => break,
                    None => eprintln!("Unknown command: {} (try 'help')", line.trim()),
                }
                printer.print(runtime.model(), false);
            }
            progressed = runtime.step(), if runtime.has_pending() => {
                if progressed {
                    printer.print(runtime.model(), false);
                }
            }
        }
    }

    runtime.dispatch(Message::CloseCamera);
    Ok(ExitCode::SUCCESS)
}
