//! PDF Overlay CLI - Command line tool for stamping text and watermarks onto PDFs.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use pdf_overlay_core::{
    AppConfig, OverlayOutput, OverlayRequest, OverlayService, Rgb, WatermarkPosition,
    overlay::ALL_PAGES,
};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionOption {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<PositionOption> for WatermarkPosition {
    fn from(opt: PositionOption) -> Self {
        match opt {
            PositionOption::Center => Self::Center,
            PositionOption::TopLeft => Self::TopLeft,
            PositionOption::TopRight => Self::TopRight,
            PositionOption::BottomLeft => Self::BottomLeft,
            PositionOption::BottomRight => Self::BottomRight,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf-overlay")]
#[command(author, version, about = "Stamp text overlays and watermarks onto PDF documents", long_about = None)]
struct Args {
    /// Input PDF file, or an http(s) URL to fetch it from
    #[arg(required = true)]
    input: String,

    /// Output PDF file (default: <input>-overlay.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON request file; its pdfBase64/pdfUrl fields are ignored
    #[arg(short, long, conflicts_with_all = ["text", "watermark"])]
    request: Option<PathBuf>,

    /// Text to draw
    #[arg(long)]
    text: Option<String>,

    /// Horizontal position in points from the left edge
    #[arg(long, allow_negative_numbers = true, requires = "text")]
    x: Option<f64>,

    /// Vertical position in points from the bottom edge
    #[arg(long, allow_negative_numbers = true, requires = "text")]
    y: Option<f64>,

    /// Page to draw the text on (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "all_pages", requires = "text")]
    page: Option<u32>,

    /// Draw the text on every page
    #[arg(long, requires = "text")]
    all_pages: bool,

    /// Font size in points (applies to text and watermark)
    #[arg(long)]
    font_size: Option<f64>,

    /// Color as a name (black, gray, red, blue) or "r,g,b" with channels in 0..1
    #[arg(long)]
    color: Option<String>,

    /// Opacity between 0 and 1
    #[arg(long)]
    opacity: Option<f64>,

    /// Counter-clockwise rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<f64>,

    /// Watermark text
    #[arg(long)]
    watermark: Option<String>,

    /// Watermark position
    #[arg(long, value_enum, default_value = "center")]
    position: PositionOption,

    /// Stamp the watermark on the first page only
    #[arg(long)]
    watermark_first_page_only: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parse `--color`: a known name or three comma-separated channels.
fn parse_color(spec: &str) -> Result<Value> {
    if let Some(rgb) = Rgb::from_name(spec) {
        return Ok(json!({ "r": rgb.r, "g": rgb.g, "b": rgb.b }));
    }

    let channels = spec
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid color: {spec}"))?;

    match channels.as_slice() {
        [r, g, b] => Ok(json!({ "r": r, "g": g, "b": b })),
        _ => bail!("Invalid color: {spec} (expected a name or r,g,b)"),
    }
}

/// Styling flags shared by the text and the watermark.
fn style_fields(args: &Args) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    if let Some(size) = args.font_size {
        fields.insert("fontSize".to_string(), json!(size));
    }
    if let Some(color) = &args.color {
        fields.insert("color".to_string(), parse_color(color)?);
    }
    if let Some(opacity) = args.opacity {
        fields.insert("opacity".to_string(), json!(opacity));
    }
    if let Some(rotate) = args.rotate {
        fields.insert("rotate".to_string(), json!(rotate));
    }
    Ok(fields)
}

/// Build the request JSON from command line flags.
fn request_from_flags(args: &Args) -> Result<Value> {
    let style = style_fields(args)?;
    let mut request = Map::new();

    if let Some(text) = &args.text {
        let mut entry = style.clone();
        entry.insert("text".to_string(), json!(text));
        if let Some(x) = args.x {
            entry.insert("x".to_string(), json!(x));
        }
        if let Some(y) = args.y {
            entry.insert("y".to_string(), json!(y));
        }
        let page = if args.all_pages {
            Some(ALL_PAGES)
        } else {
            args.page.map(|p| i64::from(p) - 1)
        };
        if let Some(page) = page {
            entry.insert("pageNumber".to_string(), json!(page));
        }
        request.insert("texts".to_string(), Value::Array(vec![Value::Object(entry)]));
    }

    if let Some(text) = &args.watermark {
        let mut watermark = style;
        watermark.insert("text".to_string(), json!(text));
        watermark.insert(
            "position".to_string(),
            json!(WatermarkPosition::from(args.position).as_str()),
        );
        watermark.insert("applyToAll".to_string(), json!(!args.watermark_first_page_only));
        request.insert("watermark".to_string(), Value::Object(watermark));
    }

    if request.is_empty() {
        bail!("Nothing to draw: pass --text, --watermark or --request");
    }

    Ok(Value::Object(request))
}

/// Read a request file, dropping any document it names.
fn load_request_file(path: &Path) -> Result<OverlayRequest> {
    let body = std::fs::read(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    let mut request = OverlayRequest::from_json(&body)?;
    request.pdf_base64 = None;
    request.pdf_url = None;
    Ok(request)
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// `<stem>-overlay.pdf`, next to a local input or in the working directory for URLs.
fn default_output_path(input: &str) -> PathBuf {
    if is_url(input) {
        let name = input
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default();
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("output");
        return PathBuf::from(format!("{stem}-overlay.pdf"));
    }

    let input = Path::new(input);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}-overlay.pdf"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    let request = match &args.request {
        Some(path) => load_request_file(path)?,
        None => serde_json::from_value(request_from_flags(&args)?)
            .context("Failed to build overlay request")?,
    };

    let output: OverlayOutput = if is_url(&args.input) {
        info!("Fetching PDF: {}", args.input);
        let service = OverlayService::new(config).context("Failed to initialize fetcher")?;
        let request = OverlayRequest {
            pdf_url: Some(args.input.clone()),
            ..request
        };
        service
            .process(request)
            .await
            .with_context(|| format!("Failed to overlay {}", args.input))?
    } else {
        info!("Loading PDF: {}", args.input);
        let bytes = std::fs::read(&args.input)
            .with_context(|| format!("Failed to read PDF: {}", args.input))?;
        pdf_overlay_core::overlay_pdf(&bytes, &request)
            .with_context(|| format!("Failed to overlay {}", args.input))?
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    std::fs::write(&output_path, &output.pdf_bytes)
        .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Overlay PDF saved to: {} ({} pages)",
            output_path.display(),
            output.page_count
        );
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pdf-overlay").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("0.1, 0.2,0.3").unwrap(), json!({ "r": 0.1, "g": 0.2, "b": 0.3 }));
        assert_eq!(parse_color("RED").unwrap()["r"], json!(0.8));
        assert!(parse_color("0.1,0.2").is_err());
        assert!(parse_color("purple").is_err());
    }

    #[test]
    fn test_page_flag_is_one_based() {
        let args = parse(&["in.pdf", "--text", "Hi", "--page", "3", "--x", "-5"]);
        let request = request_from_flags(&args).unwrap();
        assert_eq!(request["texts"][0]["pageNumber"], json!(2));
        assert_eq!(request["texts"][0]["x"], json!(-5.0));
        assert!(request.get("watermark").is_none());
    }

    #[test]
    fn test_page_zero_rejected() {
        let result = Args::try_parse_from(["pdf-overlay", "in.pdf", "--text", "Hi", "--page", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_placement_flags_require_text() {
        for flags in [
            &["in.pdf", "--watermark", "DRAFT", "--x", "10"][..],
            &["in.pdf", "--watermark", "DRAFT", "--y", "10"],
            &["in.pdf", "--watermark", "DRAFT", "--page", "2"],
            &["in.pdf", "--watermark", "DRAFT", "--all-pages"],
        ] {
            let result = Args::try_parse_from(std::iter::once("pdf-overlay").chain(flags.iter().copied()));
            assert!(result.is_err(), "accepted {flags:?}");
        }
    }

    #[test]
    fn test_all_pages_and_watermark() {
        let args = parse(&[
            "in.pdf",
            "--text",
            "Hi",
            "--all-pages",
            "--watermark",
            "DRAFT",
            "--position",
            "bottom-right",
            "--watermark-first-page-only",
            "--opacity",
            "0.3",
        ]);
        let request = request_from_flags(&args).unwrap();
        assert_eq!(request["texts"][0]["pageNumber"], json!(ALL_PAGES));
        assert_eq!(request["watermark"]["position"], json!("bottom-right"));
        assert_eq!(request["watermark"]["applyToAll"], json!(false));
        assert_eq!(request["watermark"]["opacity"], json!(0.3));
    }

    #[test]
    fn test_nothing_to_draw() {
        assert!(request_from_flags(&parse(&["in.pdf"])).is_err());
    }

    #[test]
    fn test_request_file_ignores_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pdfUrl": "https://example.com/x.pdf", "pdfBase64": "JVBERi0=", "text": "Hi"}}"#
        )
        .unwrap();

        let request = load_request_file(file.path()).unwrap();
        assert!(request.pdf_url.is_none());
        assert!(request.pdf_base64.is_none());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("docs/report.pdf"),
            PathBuf::from("docs/report-overlay.pdf")
        );
        assert_eq!(
            default_output_path("https://example.com/files/invoice.pdf?sig=abc"),
            PathBuf::from("invoice-overlay.pdf")
        );
        assert_eq!(
            default_output_path("https://example.com/"),
            PathBuf::from("output-overlay.pdf")
        );
    }
}
