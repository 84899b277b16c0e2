// Imports
use crate::{export, inspect, validators};
use anyhow::Context;
use clap::Parser;
use oofcanvas::{Canvas, ExportFormat, ExportPrefs, Scene};
use path_absolutize::Absolutize;
use smol::fs::File;
use smol::io::{AsyncReadExt, AsyncWriteExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

///    oofcanvas{n}{n}
///    This program is free software; you can redistribute it{n}
///    and/or modify it under the terms of the GPL v3 or (at your option){n}
///    any later version.
#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Exports the scene as png or pdf.{n}
    /// The format is recognized from the extension of the output file, unless "--format" is given.{n}
    /// Without "--output-file" the scene file name is used with the extension changed.
    Export {
        /// The scene file.
        scene_file: PathBuf,
        /// The export output file.
        #[arg(short = 'o', long)]
        output_file: Option<PathBuf>,
        /// The export format.
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,
        /// The size of the larger side of the export, in pixels.
        #[arg(short = 'm', long, default_value_t = ExportPrefs::default().max_pixels)]
        max_pixels: u32,
        /// Export without background.
        #[arg(short = 'b', long, action = clap::ArgAction::SetTrue)]
        no_background: bool,
        /// Export only the region between two corners, in user coordinates.
        #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"], allow_negative_numbers = true)]
        region: Option<Vec<f64>>,
        /// The action that will be performed if the output file already exists.
        #[arg(long, default_value = "ask")]
        on_conflict: OnConflict,
    },
    /// Lists the items under a point on clickable layers.
    Click {
        /// The scene file.
        scene_file: PathBuf,
        /// X-coordinate of the point, in user units.
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Y-coordinate of the point, in user units.
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Only list the items of the layer with this name.
        #[arg(short = 'l', long)]
        layer: Option<String>,
    },
    /// Prints the layers, their item counts and the bounds of the scene.
    Info {
        /// The scene file.
        scene_file: PathBuf,
        /// Width in pixels for which the ppu that fills it is computed.
        #[arg(long, default_value_t = 1000.0)]
        width: f64,
        /// Height in pixels for which the ppu that fills it is computed.
        #[arg(long, default_value_t = 1000.0)]
        height: f64,
    },
    /// Prints every layer and item of the scene.
    Dump {
        /// The scene file.
        scene_file: PathBuf,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum OnConflict {
    #[default]
    /// Ask what to do.
    Ask,
    /// Overwrite the existing file.
    Overwrite,
    /// Skip the export.
    Skip,
    /// Append a number as a suffix to the file name.
    Suffix,
}

impl std::fmt::Display for OnConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ask => "Ask again",
                Self::Overwrite => "Overwrite existing file",
                Self::Skip => "Skip file",
                Self::Suffix => "Append a number as a suffix to the file name",
            }
        )
    }
}

pub(crate) fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Initializing tracing subscriber failed, Err: {e:?}");
    }
}

pub(crate) async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            scene_file,
            output_file,
            format,
            max_pixels,
            no_background,
            region,
            on_conflict,
        } => {
            let region = region
                .as_deref()
                .map(validators::region_corners)
                .transpose()?;
            export::run_export(
                &scene_file,
                output_file,
                format,
                max_pixels,
                !no_background,
                region,
                on_conflict,
            )
            .await?;
        }
        Command::Click {
            scene_file,
            x,
            y,
            layer,
        } => {
            let canvas = load_canvas(&scene_file).await?;
            let mut stdout = std::io::stdout().lock();
            inspect::run_click(&mut stdout, &canvas, na::vector![x, y], layer.as_deref())?;
        }
        Command::Info {
            scene_file,
            width,
            height,
        } => {
            let canvas = load_canvas(&scene_file).await?;
            let mut stdout = std::io::stdout().lock();
            inspect::run_info(&mut stdout, &canvas, width, height)?;
        }
        Command::Dump { scene_file } => {
            let canvas = load_canvas(&scene_file).await?;
            let mut stdout = std::io::stdout().lock();
            inspect::run_dump(&mut stdout, &canvas)?;
        }
    }

    Ok(())
}

/// Loads the scene file into a canvas. Image files are resolved relative to the scene.
pub(crate) async fn load_canvas(scene_file: &Path) -> anyhow::Result<Canvas> {
    validators::path_is_file(scene_file)?;
    let scene_file = scene_file.absolutize()?.to_path_buf();
    let bytes = read_bytes_from_file(&scene_file).await?;
    let scene = Scene::load_from_bytes(&bytes)
        .with_context(|| format!("Parsing scene file \"{}\" failed", scene_file.display()))?;
    let canvas = scene
        .into_canvas(scene_file.parent())
        .with_context(|| format!("Building canvas from \"{}\" failed", scene_file.display()))?;
    debug!(
        "loaded scene \"{}\" with {} layers",
        scene_file.display(),
        canvas.n_layers()
    );
    Ok(canvas)
}

pub(crate) fn new_progressbar(message: String) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner().with_message(message);
    pb.set_draw_target(indicatif::ProgressDrawTarget::stdout());
    pb.enable_steady_tick(Duration::from_millis(8));
    pb
}

pub(crate) async fn read_bytes_from_file(file_path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let mut bytes = vec![];
    let mut fh = File::open(file_path).await?;
    fh.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

pub(crate) async fn create_overwrite_file_w_bytes(
    output_file: impl AsRef<Path>,
    bytes: &[u8],
) -> anyhow::Result<()> {
    let mut fh = File::create(output_file).await?;
    fh.write_all(bytes).await?;
    fh.sync_all().await?;
    Ok(())
}
