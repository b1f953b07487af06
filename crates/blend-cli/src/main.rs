//! Command-line front end for the blend pipeline
//!
//! Composites image files given on the command line into one output file.
//! Options can come from a JSON options file, from flags, or both; flags win.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use blend_core::utils::{parse_hex_color, unpack_argb};
use blend_core::{BlendOptions, BlendRequest, LayerSpec, Palette, TintOptions};
use blend_renderer::{BlendService, ServiceConfig};
use log::{debug, info, warn};

const USAGE: &str = "\
Usage: blend [OPTIONS] -o <OUTPUT> [LAYER]...

Layers are listed bottom first as PATH or PATH@X,Y.

Options:
  -o, --output <FILE>       Output file
      --options <FILE>      JSON options object
      --width <N>           Canvas width
      --height <N>          Canvas height
      --format <NAME>       png, jpeg or jpg
      --quality <N>         JPEG quality or PNG palette size
      --matte <COLOR>       #rrggbb or #rrggbbaa
      --mode <NAME>         octree or hextree
      --encoder <NAME>      libpng or miniz
      --compression <N>     PNG compression level
      --palette <COLORS>    Comma-separated fixed palette
      --reencode            Never pass a layer through unchanged
      --tint                Run the HSL tint stage
      --workers <N>         Worker threads, 0 for one per CPU
  -h, --help                Print this help";

/// Layer file and its offset
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayerArg {
    path: PathBuf,
    x: i32,
    y: i32,
}

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    layers: Vec<LayerArg>,
    output: Option<PathBuf>,
    options_file: Option<PathBuf>,
    overrides: BlendOptions,
    palette: Option<String>,
    workers: usize,
}

#[derive(Debug)]
enum Command {
    Help,
    Run(CliArgs),
}

fn parse_layer(arg: &str) -> Result<LayerArg> {
    let Some((path, offset)) = arg.rsplit_once('@') else {
        return Ok(LayerArg {
            path: PathBuf::from(arg),
            x: 0,
            y: 0,
        });
    };
    let (x, y) = offset
        .split_once(',')
        .ok_or_else(|| anyhow!("layer offset must be X,Y: {arg}"))?;
    Ok(LayerArg {
        path: PathBuf::from(path),
        x: x.trim().parse::<i32>().with_context(|| format!("bad x offset in {arg}"))?,
        y: y.trim().parse::<i32>().with_context(|| format!("bad y offset in {arg}"))?,
    })
}

fn parse_number(flag: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .with_context(|| format!("{flag} expects an integer, got {value}"))
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs {
        workers: 1,
        ..CliArgs::default()
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| anyhow!("{arg} expects a value"))
        };
        let overrides = &mut parsed.overrides;
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-o" | "--output" => parsed.output = Some(PathBuf::from(value()?)),
            "--options" => parsed.options_file = Some(PathBuf::from(value()?)),
            "--width" => overrides.width = Some(parse_number(&arg, &value()?)?),
            "--height" => overrides.height = Some(parse_number(&arg, &value()?)?),
            "--format" => overrides.format = Some(value()?),
            "--quality" => overrides.quality = Some(parse_number(&arg, &value()?)?),
            "--matte" => overrides.matte = Some(value()?),
            "--mode" => overrides.mode = Some(value()?),
            "--encoder" => overrides.encoder = Some(value()?),
            "--compression" => overrides.compression = Some(parse_number(&arg, &value()?)?),
            "--palette" => parsed.palette = Some(value()?),
            "--reencode" => overrides.reencode = Some(true),
            "--tint" => overrides.tint = Some(TintOptions::default()),
            "--workers" => {
                let raw = value()?;
                parsed.workers = raw
                    .parse::<usize>()
                    .with_context(|| format!("--workers expects a count, got {raw}"))?;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option {flag}"),
            _ => parsed.layers.push(parse_layer(&arg)?),
        }
    }

    Ok(Command::Run(parsed))
}

fn parse_palette(list: &str) -> Result<Palette> {
    let colors = list
        .split(',')
        .map(|color| parse_hex_color(color.trim()).map(unpack_argb))
        .collect::<Result<Vec<_>, _>>()?;
    let palette = Palette::new(colors);
    if !palette.is_valid() {
        bail!("palette must hold 1 to {} colors", Palette::MAX_COLORS);
    }
    Ok(palette)
}

/// Options file first, then every flag that was given
fn load_options(options_file: Option<&Path>, overrides: BlendOptions) -> Result<BlendOptions> {
    let mut options = match options_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read options file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse options file {}", path.display()))?
        }
        None => BlendOptions::default(),
    };

    let BlendOptions {
        format,
        quality,
        reencode,
        width,
        height,
        matte,
        mode,
        encoder,
        compression,
        tint,
        palette,
    } = overrides;
    options.format = format.or(options.format);
    options.quality = quality.or(options.quality);
    options.reencode = reencode.or(options.reencode);
    options.width = width.or(options.width);
    options.height = height.or(options.height);
    options.matte = matte.or(options.matte);
    options.mode = mode.or(options.mode);
    options.encoder = encoder.or(options.encoder);
    options.compression = compression.or(options.compression);
    options.tint = tint.or(options.tint);
    options.palette = palette.or(options.palette);
    Ok(options)
}

fn run(args: CliArgs) -> Result<()> {
    let output_path = args
        .output
        .ok_or_else(|| anyhow!("no output file given, use -o <FILE>"))?;

    let mut options = load_options(args.options_file.as_deref(), args.overrides)?;
    if let Some(list) = &args.palette {
        options.palette = Some(Arc::new(parse_palette(list)?));
    }

    let layers = args
        .layers
        .iter()
        .map(|layer| {
            let data = fs::read(&layer.path)
                .with_context(|| format!("failed to read layer {}", layer.path.display()))?;
            debug!("read {} bytes from {}", data.len(), layer.path.display());
            Ok(LayerSpec::new(data).at(layer.x, layer.y))
        })
        .collect::<Result<Vec<_>>>()?;

    let request = BlendRequest::from_options(layers, &options)?;
    let service = BlendService::new(ServiceConfig::default().with_workers(args.workers))?;
    let output = service.blend(request)?;

    for warning in &output.warnings {
        warn!("{warning}");
    }
    fs::write(&output_path, &output.data)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    info!(
        "wrote {} bytes to {}",
        output.data.len(),
        output_path.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match parse_args(env::args().skip(1)) {
        Ok(Command::Help) => println!("{USAGE}"),
        Ok(Command::Run(args)) => {
            if let Err(err) = run(args) {
                eprintln!("error: {err:#}");
                process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}\n\n{USAGE}");
            process::exit(2);
        }
    }
}
