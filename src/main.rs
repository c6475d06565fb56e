use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notesight::{CurrencyDetector, OcrsRecognizer, TextRecognizer};

#[derive(Parser)]
#[command(name = "notesight")]
#[command(about = "Identify INR note denominations from a photographed frame")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Upper bound on a single text-recognition call, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    ocr_timeout_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let recognizer: Arc<dyn TextRecognizer> = Arc::new(OcrsRecognizer::from_cache_dir()?);
    let detector = CurrencyDetector::new(recognizer)
        .with_verbose(args.verbose)
        .with_ocr_timeout(Duration::from_millis(args.ocr_timeout_ms));

    let verdict = detector.detect(&img);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    println!("\n=== Currency Detection Result ===");
    if verdict.success {
        if let Some(denomination) = verdict.denomination {
            println!("Denomination: {}", denomination);
        }
        if let Some(confidence) = verdict.confidence {
            println!("Confidence: {:.2}%", confidence);
        }
        if let Some(color_name) = verdict.color_name {
            println!("Note color: {}", color_name);
        }
        if let Some(method) = &verdict.method {
            println!("Method: {}", method);
        }
        println!("Verified: {}", if verdict.verified { "yes" } else { "no" });
    } else {
        println!("No result: {}", verdict.message);
    }

    Ok(())
}
