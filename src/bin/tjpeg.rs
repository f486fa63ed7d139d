//! tjpeg CLI - JPEG decoding and encoding through libjpeg-turbo.
//!
//! The TurboJPEG shared library is loaded at run time from `--lib`, the
//! `TURBOJPEG_LIB` environment variable, or the platform default path.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use turbojpeg_rs::{PixelFormat, Raster, Subsampling, TurboJpeg};

/// JPEG codec front end for libjpeg-turbo
#[derive(Parser)]
#[command(name = "tjpeg")]
#[command(author = "turbojpeg-rs contributors")]
#[command(version)]
#[command(about = "Decode, encode and transcode JPEG images with libjpeg-turbo", long_about = None)]
#[command(after_help = "EXAMPLES:
    tjpeg decode -i image.jpg -o pixels.raw -p bgr
    tjpeg decode -i image.jpg -o image.ppm -p rgb -f ppm
    tjpeg encode -i pixels.raw -o image.jpg -w 640 -H 480 -p rgb -q 90 -s 420
    tjpeg transcode -i input.jpg -o output.jpg -q 75
    tjpeg info -i image.jpg

The library path defaults to the platform's libjpeg-turbo install location.
Override it with --lib or TURBOJPEG_LIB.")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to the TurboJPEG shared library
    #[arg(long = "lib", global = true, env = "TURBOJPEG_LIB")]
    library: Option<PathBuf>,

    /// Log codec activity (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a JPEG image to raw pixels or PPM/PGM
    #[command(visible_alias = "d")]
    Decode {
        /// Input JPEG file
        #[arg(short, long, help = "Path to the input JPEG file")]
        input: PathBuf,

        /// Output file for decoded pixels
        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        /// Pixel layout of the decoded raster
        #[arg(short, long, default_value = "bgr", value_enum)]
        pixel_format: PixelFormatArg,

        /// Output container: raw (binary pixels) or ppm (Portable PixMap)
        #[arg(short, long, default_value = "raw", value_enum)]
        format: OutputFormat,
    },

    /// Encode raw pixels to JPEG
    ///
    /// Input must be tightly packed 8-bit pixels in the given pixel format.
    #[command(visible_alias = "e")]
    Encode {
        /// Input raw pixel file
        #[arg(short, long, help = "Path to raw pixel data file")]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long, help = "Path for the encoded output file")]
        output: PathBuf,

        /// Image width in pixels
        #[arg(short, long)]
        width: u32,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: u32,

        /// Pixel layout of the input
        #[arg(short, long, default_value = "bgr", value_enum)]
        pixel_format: PixelFormatArg,

        #[command(flatten)]
        options: EncodeArgs,
    },

    /// Decode a JPEG and encode it again
    #[command(visible_alias = "t")]
    Transcode {
        /// Input JPEG file
        #[arg(short, long, help = "Path to the input JPEG file")]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long, help = "Path for the transcoded output file")]
        output: PathBuf,

        #[command(flatten)]
        options: EncodeArgs,
    },

    /// Display JPEG header information
    #[command(visible_alias = "i")]
    Info {
        /// Input file path
        #[arg(short, long, help = "Path to the JPEG file to inspect")]
        input: PathBuf,
    },
}

#[derive(Args)]
struct EncodeArgs {
    /// Quality level (0-100), checked by libjpeg-turbo
    #[arg(short, long, default_value_t = turbojpeg_rs::constants::DEFAULT_QUALITY, allow_negative_numbers = true)]
    quality: i32,

    /// Chroma subsampling
    #[arg(short, long, default_value = "422", value_enum)]
    subsampling: SubsamplingArg,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Raw binary pixel data
    Raw,
    /// Portable PixMap (PPM for RGB, PGM for grayscale)
    Ppm,
}

#[derive(Clone, Copy, ValueEnum)]
enum PixelFormatArg {
    Rgb,
    Bgr,
    Rgbx,
    Bgrx,
    Xbgr,
    Xrgb,
    Gray,
    Rgba,
    Bgra,
    Abgr,
    Argb,
    Cmyk,
}

impl From<PixelFormatArg> for PixelFormat {
    fn from(arg: PixelFormatArg) -> Self {
        match arg {
            PixelFormatArg::Rgb => PixelFormat::Rgb,
            PixelFormatArg::Bgr => PixelFormat::Bgr,
            PixelFormatArg::Rgbx => PixelFormat::Rgbx,
            PixelFormatArg::Bgrx => PixelFormat::Bgrx,
            PixelFormatArg::Xbgr => PixelFormat::Xbgr,
            PixelFormatArg::Xrgb => PixelFormat::Xrgb,
            PixelFormatArg::Gray => PixelFormat::Gray,
            PixelFormatArg::Rgba => PixelFormat::Rgba,
            PixelFormatArg::Bgra => PixelFormat::Bgra,
            PixelFormatArg::Abgr => PixelFormat::Abgr,
            PixelFormatArg::Argb => PixelFormat::Argb,
            PixelFormatArg::Cmyk => PixelFormat::Cmyk,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SubsamplingArg {
    /// 4:4:4, full chroma resolution
    #[value(name = "444")]
    S444,
    /// 4:2:2
    #[value(name = "422")]
    S422,
    /// 4:2:0
    #[value(name = "420")]
    S420,
    /// Grayscale output
    Gray,
    /// 4:4:0
    #[value(name = "440")]
    S440,
}

impl From<SubsamplingArg> for Subsampling {
    fn from(arg: SubsamplingArg) -> Self {
        match arg {
            SubsamplingArg::S444 => Subsampling::S444,
            SubsamplingArg::S422 => Subsampling::S422,
            SubsamplingArg::S420 => Subsampling::S420,
            SubsamplingArg::Gray => Subsampling::Gray,
            SubsamplingArg::S440 => Subsampling::S440,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = load_library(cli.global.library.as_deref()).and_then(|tj| match cli.command {
        Commands::Decode {
            input,
            output,
            pixel_format,
            format,
        } => decode_image(&tj, &input, &output, pixel_format.into(), &format),
        Commands::Encode {
            input,
            output,
            width,
            height,
            pixel_format,
            options,
        } => encode_image(
            &tj,
            &input,
            &output,
            width,
            height,
            pixel_format.into(),
            &options,
        ),
        Commands::Transcode {
            input,
            output,
            options,
        } => transcode_image(&tj, &input, &output, &options),
        Commands::Info { input } => show_info(&tj, &input),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "turbojpeg_rs=debug",
        _ => "turbojpeg_rs=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_library(path: Option<&Path>) -> Result<TurboJpeg, Box<dyn std::error::Error>> {
    let tj = match path {
        Some(path) => TurboJpeg::with_library(path)?,
        None => TurboJpeg::new()?,
    };
    Ok(tj)
}

fn decode_image(
    tj: &TurboJpeg,
    input: &Path,
    output: &Path,
    pixel_format: PixelFormat,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let raster = tj.decode(&data, pixel_format)?;

    match format {
        OutputFormat::Raw => {
            fs::write(output, raster.data())?;
        }
        OutputFormat::Ppm => {
            write_ppm(output, &raster)?;
        }
    }

    let (height, width, channels) = raster.shape();
    println!(
        "✓ Decoded {}x{} image ({} channels, {:?}) to {:?}",
        width, height, channels, pixel_format, output
    );
    Ok(())
}

fn encode_image(
    tj: &TurboJpeg,
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    options: &EncodeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pixels = fs::read(input)?;
    let raster = Raster::new(width, height, pixel_format, pixels)?;
    let encoded = tj.encode(&raster, options.quality, options.subsampling.into())?;

    fs::write(output, &encoded)?;
    println!(
        "✓ Encoded {}x{} image to {:?} ({} bytes, quality {})",
        width,
        height,
        output,
        encoded.len(),
        options.quality
    );
    Ok(())
}

fn transcode_image(
    tj: &TurboJpeg,
    input: &Path,
    output: &Path,
    options: &EncodeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let raster = tj.decode(&data, PixelFormat::Bgr)?;
    let encoded = tj.encode(&raster, options.quality, options.subsampling.into())?;

    fs::write(output, &encoded)?;
    println!(
        "✓ Transcoded {}x{} image to {:?} ({} -> {} bytes)",
        raster.width(),
        raster.height(),
        output,
        data.len(),
        encoded.len()
    );
    Ok(())
}

fn show_info(tj: &TurboJpeg, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let info = tj.decode_header(&data)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!("Library: {:?}", tj.library_path());
    println!();
    println!("  Dimensions:  {}x{}", info.width, info.height);
    println!("  Subsampling: {}", subsampling_label(info.subsampling));
    println!("  Colorspace:  {:?}", info.colorspace);

    Ok(())
}

fn subsampling_label(subsampling: Subsampling) -> &'static str {
    match subsampling {
        Subsampling::S444 => "4:4:4",
        Subsampling::S422 => "4:2:2",
        Subsampling::S420 => "4:2:0",
        Subsampling::Gray => "grayscale",
        Subsampling::S440 => "4:4:0",
        Subsampling::S411 => "4:1:1",
        Subsampling::S441 => "4:4:1",
        Subsampling::Unknown => "unknown",
    }
}

fn write_ppm(path: &Path, raster: &Raster) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;

    let magic = match raster.pixel_format() {
        PixelFormat::Gray => "P5",
        PixelFormat::Rgb => "P6",
        other => {
            return Err(format!("PPM output needs rgb or gray pixels, got {:?}", other).into());
        }
    };

    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", magic)?;
    writeln!(file, "{} {}", raster.width(), raster.height())?;
    writeln!(file, "255")?;
    file.write_all(raster.data())?;

    Ok(())
}
