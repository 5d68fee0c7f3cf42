use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use camera_proxy::media::{MediaCapabilities, MediaStream, NativeUserMedia};
use camera_proxy::page::{
    ActivationEvent, Element, ElementId, EventSupport, OverlayAction, Page, SelectedFile,
};
use camera_proxy::{CameraProxy, CaptureOptions, DataUrl, EncodingType, ProxyConfig, SourceMode};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Page hosted in a terminal: the "file dialog" returns the file named on the
/// command line, and the capture overlay is driven by Enter and Ctrl-C.
struct TerminalPage {
    file: Mutex<Option<SelectedFile>>,
    actions: tokio::sync::Mutex<mpsc::UnboundedReceiver<OverlayAction>>,
}

impl TerminalPage {
    fn new(file: Option<SelectedFile>, actions: mpsc::UnboundedReceiver<OverlayAction>) -> Self {
        Self {
            file: Mutex::new(file),
            actions: tokio::sync::Mutex::new(actions),
        }
    }
}

#[async_trait]
impl Page for TerminalPage {
    fn event_support(&self) -> EventSupport {
        EventSupport::Native
    }

    fn append(&self, element: Element) -> ElementId {
        let id = ElementId::new();
        log::debug!("append {} {:?}", id, element);
        if let Element::CaptureOverlay(spec) = element {
            eprintln!(
                "Camera live at {}x{}. Press Enter to {}, Ctrl-C to {}.",
                spec.video_width,
                spec.video_height,
                spec.capture_label.to_lowercase(),
                spec.cancel_label.to_lowercase()
            );
        }
        id
    }

    fn remove(&self, id: ElementId) -> bool {
        log::debug!("remove {}", id);
        true
    }

    fn dispatch(&self, id: ElementId, event: ActivationEvent) {
        log::debug!("dispatch {} on {}", event.kind(), id);
    }

    fn attach_stream(&self, id: ElementId, stream: Arc<dyn MediaStream>) {
        log::debug!("stream {} bound to {}", stream.id(), id);
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    async fn file_selection(&self, _id: ElementId) -> Vec<SelectedFile> {
        match self.file.lock() {
            Ok(mut file) => file.take().into_iter().collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn overlay_action(&self, _id: ElementId) -> OverlayAction {
        self.actions
            .lock()
            .await
            .recv()
            .await
            .unwrap_or(OverlayAction::Cancel)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    camera_proxy::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: camera-proxy-cli <normalize|capture> [args]");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "normalize" => cmd_normalize(&args).await,
        "capture" => cmd_capture(&args).await,
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

/// Flags shared by both commands
struct Flags {
    positional: Vec<String>,
    encoding: Option<String>,
    width: i64,
    height: i64,
    quality: Option<i64>,
    device: Option<u32>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_flags(args: &[String]) -> Result<Flags> {
    let mut flags = Flags {
        positional: Vec::new(),
        encoding: None,
        width: -1,
        height: -1,
        quality: None,
        device: None,
        out: None,
        config: None,
    };

    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        let mut value = |name: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} needs a value", name))
        };
        match arg.as_str() {
            "--encoding" => flags.encoding = Some(value("--encoding")?),
            "--width" => flags.width = value("--width")?.parse::<i64>().context("--width")?,
            "--height" => flags.height = value("--height")?.parse::<i64>().context("--height")?,
            "--quality" => {
                flags.quality = Some(value("--quality")?.parse::<i64>().context("--quality")?)
            }
            "--device" => {
                flags.device = Some(value("--device")?.parse::<u32>().context("--device")?)
            }
            "--out" => flags.out = Some(PathBuf::from(value("--out")?)),
            "--config" => flags.config = Some(PathBuf::from(value("--config")?)),
            other if other.starts_with("--") => bail!("Unknown flag: {}", other),
            other => flags.positional.push(other.to_string()),
        }
    }
    Ok(flags)
}

fn load_config(flags: &Flags) -> Result<ProxyConfig> {
    match &flags.config {
        Some(path) => Ok(ProxyConfig::load_from_file(path)?),
        None => Ok(ProxyConfig::load_or_default()),
    }
}

fn options_for(mode: SourceMode, flags: &Flags, config: &ProxyConfig) -> CaptureOptions {
    let encoding = flags
        .encoding
        .as_deref()
        .unwrap_or(&config.capture.default_encoding);
    CaptureOptions::new(mode)
        .with_quality(
            flags
                .quality
                .unwrap_or(config.capture.default_quality as i64),
        )
        .with_target(flags.width, flags.height)
        .with_encoding(EncodingType::from_mime(encoding))
}

fn mime_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

fn emit(url: &DataUrl, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            let bytes = url.decode_bytes()?;
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} ({} bytes) to {}", url.mime_type(), bytes.len(), path.display());
        }
        None => println!("{}", url),
    }
    Ok(())
}

async fn cmd_normalize(args: &[String]) -> Result<()> {
    // normalize <file> [--encoding <mime>] [--width <px>] [--height <px>] [--quality <0-100>] [--out <path>]
    let flags = parse_flags(args)?;
    let path = flags
        .positional
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Usage: camera-proxy-cli normalize <file> [flags]"))?;

    let bytes =
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = SelectedFile::new(name, mime_for_path(&path), bytes);

    let config = load_config(&flags)?;
    let options = options_for(SourceMode::FilePick, &flags, &config);

    let (_tx, rx) = mpsc::unbounded_channel();
    let page = Arc::new(TerminalPage::new(Some(file), rx));
    let camera = CameraProxy::new(page, MediaCapabilities::none(), config);

    let url = camera.take_picture(&options).await?;
    emit(&url, flags.out.as_deref())
}

async fn cmd_capture(args: &[String]) -> Result<()> {
    // capture [--encoding <mime>] [--width <px>] [--height <px>] [--quality <0-100>] [--device <index>] [--out <path>]
    let flags = parse_flags(args)?;
    let config = load_config(&flags)?;
    let options = options_for(SourceMode::LiveCapture, &flags, &config);

    let (tx, rx) = mpsc::unbounded_channel();

    let cancel = tx.clone();
    ctrlc::set_handler(move || {
        let _ = cancel.send(OverlayAction::Cancel);
    })
    .context("Failed to install Ctrl-C handler")?;

    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok() {
            let _ = tx.send(OverlayAction::Capture);
        }
    });

    let native = NativeUserMedia::new(
        flags.device.unwrap_or(config.native.device_index),
        config.native.frame_rate,
    );
    let page = Arc::new(TerminalPage::new(None, rx));
    let camera = CameraProxy::new(page, MediaCapabilities::modern(Arc::new(native)), config);

    let url = camera.take_picture(&options).await?;
    emit(&url, flags.out.as_deref())
}
