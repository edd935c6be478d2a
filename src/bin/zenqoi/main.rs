//! `zenqoi` command-line driver: encode, decode, analyze and verify QOI files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::ArgMatches;
use log::{error, info, warn};
use zenqoi::{ColorSpace, DecodeRequest, EncodeRequest, QoiError, RawPixels, Unstoppable};

mod cmd_args;
mod image_io;

use image_io::ImageFormat;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Qoi(#[from] QoiError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("image: {0}")]
    Image(String),

    #[error("{0} file(s) could not be analyzed")]
    AnalyzeFailed(usize),

    #[error("pixel mismatch at ({x}, {y}): decoded {got:?}, reference {want:?}")]
    PixelMismatch {
        x: u32,
        y: u32,
        got: [u8; 4],
        want: [u8; 4],
    },
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), CliError> {
    fs::write(path, data).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn path_arg<'a>(options: &'a ArgMatches, name: &str) -> &'a Path {
    // clap enforces `required(true)` on every path argument
    options
        .get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .unwrap_or(Path::new(""))
}

/// Reference pixels normalized to straight RGBA, as the decoder produces them.
fn reference_rgba(img: &image_io::RefImage) -> Result<Vec<u8>, CliError> {
    use zenqoi::PixelSource;

    let src = RawPixels::new(&img.pixels, img.width, img.height, img.layout)?;
    let count = img.width as usize * img.height as usize;
    Ok((0..count).flat_map(|i| src.pixel(i).to_rgba()).collect())
}

fn cmd_encode(options: &ArgMatches) -> Result<(), CliError> {
    let input = path_arg(options, "in");
    let output = path_arg(options, "out");
    let img = image_io::read(&read_file(input)?)?;

    let colorspace = if options.get_flag("linear") {
        ColorSpace::Linear
    } else {
        ColorSpace::Srgb
    };
    let encoded = EncodeRequest::new().with_colorspace(colorspace).encode(
        &img.pixels,
        img.width,
        img.height,
        img.layout,
        Unstoppable,
    )?;
    write_file(output, &encoded)?;

    info!(
        "{} -> {}: {}x{}, {} bytes",
        input.display(),
        output.display(),
        img.width,
        img.height,
        encoded.len()
    );
    Ok(())
}

fn cmd_decode(options: &ArgMatches) -> Result<(), CliError> {
    let input = path_arg(options, "in");
    let output = path_arg(options, "out");
    let data = read_file(input)?;
    let decoded = DecodeRequest::new(&data).decode(Unstoppable)?;
    let format = ImageFormat::for_output(output);
    write_file(
        output,
        &image_io::write_rgba(format, decoded.width, decoded.height, decoded.pixels())?,
    )?;
    info!(
        "{} -> {}: {}x{} {:?} {:?}",
        input.display(),
        output.display(),
        decoded.width,
        decoded.height,
        decoded.channels,
        decoded.colorspace
    );
    Ok(())
}

/// Expand directories one level into the `.qoi` files they hold.
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let entries = fs::read_dir(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "qoi"))
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn analyze_one(input: &Path, out_dir: Option<&Path>) -> Result<(), CliError> {
    let data = read_file(input)?;
    let analysis = zenqoi::analyze(&data, Unstoppable)?;

    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .unwrap_or(Path::new("."))
            .join("analysis"),
    };
    fs::create_dir_all(&dir).map_err(|source| CliError::Io {
        path: dir.clone(),
        source,
    })?;

    let stem = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_string_lossy();
    let heat_path = dir.join(format!("{stem}.png"));
    let report_path = dir.join(format!("{stem}.txt"));

    write_file(
        &heat_path,
        &image_io::write_rgba(
            ImageFormat::Png,
            analysis.header.width,
            analysis.header.height,
            analysis.heat_map(),
        )?,
    )?;
    write_file(&report_path, format!("{analysis}\n").as_bytes())?;

    println!("{}", input.display());
    println!("{analysis}");
    Ok(())
}

fn cmd_analyze(options: &ArgMatches) -> Result<(), CliError> {
    let paths: Vec<PathBuf> = options
        .get_many::<PathBuf>("in")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let out_dir = options.get_one::<PathBuf>("out").map(PathBuf::as_path);

    let mut failures = 0usize;
    for input in collect_inputs(&paths)? {
        if let Err(e) = analyze_one(&input, out_dir) {
            warn!("{}: {e}", input.display());
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(CliError::AnalyzeFailed(failures));
    }
    Ok(())
}

fn cmd_verify(options: &ArgMatches) -> Result<(), CliError> {
    let qoi_path = path_arg(options, "in");
    let reference_path = path_arg(options, "reference");

    let data = read_file(qoi_path)?;
    let decoded = DecodeRequest::new(&data).decode(Unstoppable)?;
    let reference = image_io::read(&read_file(reference_path)?)?;
    let want = reference_rgba(&reference)?;

    match decoded.first_mismatch(reference.width, reference.height, &want)? {
        None => {
            println!(
                "{}: {}x{} matches {}",
                qoi_path.display(),
                decoded.width,
                decoded.height,
                reference_path.display()
            );
            Ok(())
        }
        Some((x, y)) => {
            let off = (y as usize * reference.width as usize + x as usize) * 4;
            let got = decoded.pixel(x, y).map(|p| p.to_rgba()).unwrap_or_default();
            let mut px = [0u8; 4];
            px.copy_from_slice(&want[off..off + 4]);
            Err(CliError::PixelMismatch { x, y, got, want: px })
        }
    }
}

fn run(options: &ArgMatches) -> Result<(), CliError> {
    match options.subcommand() {
        Some(("encode", sub)) => cmd_encode(sub),
        Some(("decode", sub)) => cmd_decode(sub),
        Some(("analyze", sub)) => cmd_analyze(sub),
        Some(("verify", sub)) => cmd_verify(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn main() {
    let options = cmd_args::create_cmd_args().get_matches();
    cmd_args::setup_logger(&options);

    if let Err(e) = run(&options) {
        error!("{e}");
        exit(1);
    }
}
