use anyhow::{Context, Result, bail};
use avif_stream::{
    AvifImageDecoder, ContainerKind, DecodeOptions, DecodeRequest, ImageRsDecoder, classify,
};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bytes read from each file when sniffing
const SNIFF_HEAD_LEN: u64 = 64;

#[derive(Parser)]
#[command(name = "avif-stream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sniff, measure and progressively decode AVIF images")]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with decode options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the container kind of each file
    Sniff {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print the intrinsic size of an AVIF file
    Info { file: PathBuf },

    /// Decode an AVIF file chunk by chunk, reporting previews
    Decode {
        file: PathBuf,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        max_content_size: Option<u32>,

        #[arg(long)]
        scale: Option<f64>,

        #[arg(long)]
        chunk_size: Option<usize>,

        /// Write the final raster to this path (format from extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct SniffReport {
    path: String,
    kind: ContainerKind,
    mime: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = match &cli.config {
        Some(path) => DecodeOptions::from_json_file(path)?,
        None => DecodeOptions::default(),
    };

    match cli.command {
        Commands::Sniff { files, json } => run_sniff(&files, json),
        Commands::Info { file } => run_info(&file, options),
        Commands::Decode {
            file,
            width,
            height,
            max_content_size,
            scale,
            chunk_size,
            output,
        } => {
            let mut options = options;
            if let Some(size) = chunk_size {
                options = options.with_chunk_size(size);
            }
            let mut request = options.request();
            if width.is_some() || height.is_some() {
                request.width = width;
                request.height = height;
            }
            if let Some(max) = max_content_size {
                request = request.with_max_content_size(max);
            }
            if let Some(scale) = scale {
                request = request.with_scale(scale);
            }
            run_decode(&file, options, &request, output.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_head(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut head = Vec::with_capacity(SNIFF_HEAD_LEN as usize);
    file.take(SNIFF_HEAD_LEN)
        .read_to_end(&mut head)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(head)
}

fn run_sniff(files: &[PathBuf], json: bool) -> Result<()> {
    let reports = files
        .par_iter()
        .map(|path| -> Result<SniffReport> {
            let kind = classify(&read_head(path)?);
            Ok(SniffReport {
                path: path.display().to_string(),
                kind,
                mime: kind.mime_type(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{:<12} {:<24} {}", report.kind.extension(), report.mime, report.path);
        }
    }
    Ok(())
}

fn run_info(path: &Path, options: DecodeOptions) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoder = AvifImageDecoder::new(ImageRsDecoder::new(), options);
    let dimensions = decoder
        .read_metadata(&data)
        .with_context(|| format!("Cannot read metadata of {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&dimensions)?);
    Ok(())
}

fn run_decode(
    path: &Path,
    options: DecodeOptions,
    request: &DecodeRequest,
    output: Option<&Path>,
) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let decoder = AvifImageDecoder::new(ImageRsDecoder::new(), options);

    let decoded = decoder
        .decode_stream(request, BufReader::new(file), |preview| {
            if let Some(raster) = &preview.raster {
                info!(dims = %raster.dimensions(), "preview");
            }
        })
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "kind": decoded.kind,
            "dimensions": decoded.dimensions,
            "raster": decoded.raster_dimensions(),
        }))?
    );

    if let Some(output) = output {
        let Some(raster) = &decoded.raster else {
            bail!("No raster to write: rendering is disabled in the options");
        };
        image::save_buffer(
            output,
            raster.pixels(),
            raster.width(),
            raster.height(),
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(path = %output.display(), "raster written");
    }
    Ok(())
}
