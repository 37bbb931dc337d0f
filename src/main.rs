use clap::{Args, Parser, Subcommand};
use imagebox::config::{self, ImageboxConfig};
use imagebox::imaging::{
    self, Alignment, Background, CompressParams, CropParams, Filter, ImageBackend, MergeDirection,
    MergeParams, OutputFormat, Quality, ResizeParams, RustBackend, ThumbnailParams,
};
use imagebox::inpaint::Mask;
use imagebox::output;
use imagebox::pool::{InpaintParams, Operation, TaskOutput, ToolPools};
use imagebox::upload;
use image::RgbaImage;
use log::{debug, info};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "imagebox")]
#[command(version, about = "Image editing toolkit on a worker pool")]
#[command(long_about = "\
Image editing toolkit on a worker pool

Compress, resize and thumbnail run on fixed-size worker pools, so a batch
of inputs is processed concurrently. Inpainting fills a masked area from
its surroundings. Canvas tools (crop, merge, black, filter) run inline.

Defaults come from config.toml in the --config directory, merged over the
stock values. Run 'imagebox gen-config' to generate a documented file.")]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that push several inputs through a pool.
#[derive(Args)]
struct BatchArgs {
    /// Input images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write results here instead of next to each input
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Print pool occupancy after the batch
    #[arg(long)]
    stats: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode images, bounded to a maximum size
    Compress {
        #[command(flatten)]
        batch: BatchArgs,
        /// Encoder quality, 0-1
        #[arg(long)]
        quality: Option<f32>,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[arg(long)]
        max_width: Option<u32>,
        #[arg(long)]
        max_height: Option<u32>,
    },
    /// Resize images to explicit or bounded dimensions
    Resize {
        #[command(flatten)]
        batch: BatchArgs,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        max_width: Option<u32>,
        #[arg(long)]
        max_height: Option<u32>,
        /// Stretch to width x height instead of keeping the aspect ratio
        #[arg(long)]
        stretch: bool,
        #[arg(long)]
        quality: Option<f32>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Create JPEG thumbnails
    Thumbnail {
        #[command(flatten)]
        batch: BatchArgs,
        /// Longer edge in pixels
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        quality: Option<f32>,
    },
    /// Fill the area marked by a mask image
    Inpaint {
        input: PathBuf,
        /// Mask image; any pixel with non-zero alpha marks the area to fill
        #[arg(long)]
        mask: PathBuf,
        /// simple, telea or navier-stokes
        #[arg(long)]
        method: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Cut out a rectangle, clipped to the image
    Crop {
        input: PathBuf,
        #[arg(long, default_value_t = 0)]
        x: u32,
        #[arg(long, default_value_t = 0)]
        y: u32,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Place images side by side on one canvas
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, default_value = "horizontal")]
        direction: MergeDirection,
        #[arg(long, default_value_t = 0)]
        spacing: u32,
        /// start, center or end (top/left, bottom/right also accepted)
        #[arg(long, default_value = "center")]
        align: Alignment,
        /// "transparent" or #rrggbb
        #[arg(long, default_value = "transparent")]
        background: Background,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write an opaque black image
    Black {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Apply a colour filter: grayscale, sepia or invert
    Filter {
        input: PathBuf,
        filter: Filter,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the upright image size and EXIF tags
    Exif { input: PathBuf },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> CliResult {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.command {
        Command::GenConfig => ImageboxConfig::default(),
        _ => {
            let loaded = config::load_config(&cli.config)?;
            debug!("loaded config from {}", cli.config.display());
            loaded
        }
    };
    let backend = Arc::new(RustBackend::new());

    match cli.command {
        Command::Compress {
            batch,
            quality,
            format,
            max_width,
            max_height,
        } => {
            let defaults = &config.compress;
            let quality = quality.unwrap_or(defaults.quality);
            let format = format.unwrap_or(defaults.format);
            let max_width = Some(max_width.unwrap_or(defaults.max_width));
            let max_height = Some(max_height.unwrap_or(defaults.max_height));
            run_batch(
                &config,
                backend,
                &batch,
                |image_data| {
                    Operation::Compress(CompressParams {
                        image_data,
                        quality,
                        max_width,
                        max_height,
                        format,
                    })
                },
                |input, size, out_dir, result| match result {
                    TaskOutput::Compress(out) => {
                        let dest = derive_output(input, out_dir, "compressed", out.format.extension());
                        write_data_url(&dest, &out.compressed_data)?;
                        Ok(output::format_compress_result(input, &dest, size, &out))
                    }
                    other => Err(unexpected(&other)),
                },
            )?;
        }
        Command::Resize {
            batch,
            width,
            height,
            max_width,
            max_height,
            stretch,
            quality,
            format,
        } => {
            let quality = quality.unwrap_or(config.resize.quality);
            let format = format.unwrap_or(config.resize.format);
            run_batch(
                &config,
                backend,
                &batch,
                |image_data| {
                    Operation::Resize(ResizeParams {
                        image_data,
                        width,
                        height,
                        max_width,
                        max_height,
                        maintain_aspect_ratio: !stretch,
                        quality,
                        format,
                    })
                },
                |input, _, out_dir, result| match result {
                    TaskOutput::Resize(out) => {
                        let dest = derive_output(input, out_dir, "resized", out.format.extension());
                        write_data_url(&dest, &out.resized_data)?;
                        Ok(output::format_resize_result(input, &dest, &out))
                    }
                    other => Err(unexpected(&other)),
                },
            )?;
        }
        Command::Thumbnail {
            batch,
            size,
            quality,
        } => {
            let max_size = size.unwrap_or(config.thumbnail.max_size);
            let quality = quality.unwrap_or(config.thumbnail.quality);
            run_batch(
                &config,
                backend,
                &batch,
                |image_data| {
                    Operation::Thumbnail(ThumbnailParams {
                        image_data,
                        max_size,
                        quality,
                    })
                },
                |input, _, out_dir, result| match result {
                    TaskOutput::Thumbnail(out) => {
                        let dest = derive_output(input, out_dir, "thumb", "jpg");
                        write_data_url(&dest, &out.thumbnail_data)?;
                        Ok(output::format_thumbnail_result(input, &dest, &out))
                    }
                    other => Err(unexpected(&other)),
                },
            )?;
        }
        Command::Inpaint {
            input,
            mask,
            method,
            output: dest,
        } => {
            let (bytes, upload) = upload::read_validated(&input, &config.uploads)?;
            let (mask_bytes, _) = upload::read_validated(&mask, &config.uploads)?;
            let mask_image = backend.decode(&mask_bytes)?;
            if Mask::from_image(&mask_image).count() == 0 {
                return Err(format!("{}: mask selects no pixels", mask.display()).into());
            }
            let mask_data = mask_image.into_raw();
            let method = method.unwrap_or_else(|| config.inpaint.method.to_string());

            let pools = ToolPools::new(&config.pools, config.inpaint.settings(), backend)?;
            let result = pools
                .inpaint(Operation::Inpaint(InpaintParams {
                    image_data: imaging::to_data_url(upload.mime_type, &bytes),
                    mask_data,
                    method,
                }))
                .wait_output();
            pools.shutdown();

            match result? {
                TaskOutput::Inpaint(out) => {
                    let dest = dest.unwrap_or_else(|| derive_output(&input, None, "inpainted", "png"));
                    write_data_url(&dest, &out.inpainted_data)?;
                    output::print_lines(&output::format_inpaint_result(&input, &dest, &out));
                }
                other => return Err(unexpected(&other)),
            }
        }
        Command::Crop {
            input,
            x,
            y,
            width,
            height,
            output: dest,
        } => {
            let image = load_image(&*backend, &input, &config)?;
            let cropped = imaging::crop_image(
                &image,
                CropParams {
                    x,
                    y,
                    width,
                    height,
                },
            )?;
            let dest = dest.unwrap_or_else(|| derive_output(&input, None, "cropped", "png"));
            save_image(&*backend, &cropped, &dest, "crop")?;
        }
        Command::Merge {
            inputs,
            direction,
            spacing,
            align,
            background,
            output: dest,
        } => {
            let images = inputs
                .iter()
                .map(|path| load_image(&*backend, path, &config))
                .collect::<CliResult<Vec<_>>>()?;
            let params = MergeParams {
                direction,
                spacing,
                alignment: align,
                background,
            };
            let merged = imaging::merge_images(&images, &params)?;
            save_image(&*backend, &merged, &dest, &format!("merge of {}", images.len()))?;
        }
        Command::Black {
            width,
            height,
            output: dest,
        } => {
            save_image(&*backend, &imaging::black_image(width, height), &dest, "black")?;
        }
        Command::Filter {
            input,
            filter,
            output: dest,
        } => {
            let mut image = load_image(&*backend, &input, &config)?;
            imaging::apply_filter(&mut image, filter);
            let dest = dest.unwrap_or_else(|| derive_output(&input, None, &filter.to_string(), "png"));
            save_image(&*backend, &image, &dest, &filter.to_string())?;
        }
        Command::Exif { input } => {
            let bytes = std::fs::read(&input)?;
            let dimensions = imaging::get_dimensions(&*backend, &bytes)?;
            output::print_lines(&output::format_exif(
                &input,
                dimensions,
                &imaging::read_exif(&bytes),
            ));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialise env_logger. `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Submit every input to the pool that serves its operation, then collect
/// results in input order. Failed inputs are reported and counted; the
/// command fails if any did.
fn run_batch<B, F, G>(
    config: &ImageboxConfig,
    backend: Arc<B>,
    batch: &BatchArgs,
    build: F,
    finish: G,
) -> CliResult
where
    B: ImageBackend + 'static,
    F: Fn(String) -> Operation,
    G: Fn(&Path, u64, Option<&Path>, TaskOutput) -> CliResult<Vec<String>>,
{
    let pools = ToolPools::new(&config.pools, config.inpaint.settings(), backend)?;
    if let Some(dir) = &batch.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let submitted: Vec<_> = batch
        .inputs
        .iter()
        .map(|path| {
            let job = upload::read_validated(path, &config.uploads).map(|(bytes, upload)| {
                let data = imaging::to_data_url(upload.mime_type, &bytes);
                (upload.size, pools.route(build(data)))
            });
            (path, job)
        })
        .collect();
    info!("submitted {} inputs", submitted.len());

    let total = submitted.len();
    let mut failures = 0;
    for (path, job) in submitted {
        let outcome = job
            .map_err(|e| Box::new(e) as Box<dyn Error>)
            .and_then(|(size, handle)| {
                let result = handle.wait_output()?;
                finish(path.as_path(), size, batch.out_dir.as_deref(), result)
            });
        match outcome {
            Ok(lines) => output::print_lines(&lines),
            Err(e) => {
                failures += 1;
                output::print_lines(&output::format_failure(path, &e.to_string()));
            }
        }
    }

    if batch.stats {
        output::print_lines(&output::format_pool_stats(&pools.stats()?));
    }
    pools.shutdown();

    if failures > 0 {
        return Err(format!("{failures} of {total} inputs failed").into());
    }
    Ok(())
}

/// `dir/stem.suffix.ext`, next to the input unless `out_dir` is given.
fn derive_output(input: &Path, out_dir: Option<&Path>, suffix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}.{suffix}.{ext}"))
}

fn write_data_url(dest: &Path, data_url: &str) -> CliResult {
    let parsed = imaging::parse_data_url(data_url)?;
    std::fs::write(dest, parsed.bytes)?;
    Ok(())
}

fn load_image(backend: &impl ImageBackend, path: &Path, config: &ImageboxConfig) -> CliResult<RgbaImage> {
    let (bytes, _) = upload::read_validated(path, &config.uploads)?;
    Ok(backend.decode(&bytes)?)
}

/// Encode in the format named by the destination's extension (PNG if unknown).
fn save_image(backend: &impl ImageBackend, image: &RgbaImage, dest: &Path, label: &str) -> CliResult {
    let format = dest
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse::<OutputFormat>().ok())
        .unwrap_or(OutputFormat::Png);
    let bytes = backend.encode(image, format, Quality::default())?;
    std::fs::write(dest, bytes)?;
    output::print_lines(&output::format_written(label, dest, image.dimensions()));
    Ok(())
}

fn unexpected(output: &TaskOutput) -> Box<dyn Error> {
    format!("unexpected task output: {output:?}").into()
}
