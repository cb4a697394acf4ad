/// Meshview Terminal - view and edit OBJ meshes in the terminal
///
/// Controls:
///   - Mouse drag / WASD / Arrow Keys: Rotate the model
///   - Mouse wheel / +/-: Zoom
///   - V/F: Pick vertices or faces, Click: toggle selection
///   - X/Delete: Delete selection, O: Export, Tab: Next model
///   - R/Space: Toggle auto-rotation
///   - Q/ESC: Quit

use clap::{Parser, ValueEnum};
use meshview_core::transform::DEFAULT_SCALE;
use meshview_core::{obj, RotationState, Validation, ViewState};
use meshview_terminal::{Model, TerminalApp};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshview-terminal")]
#[command(author, version, about = "Terminal OBJ mesh viewer and editor", long_about = None)]
struct Cli {
    /// OBJ files to load; a demo cube is shown when none are given
    inputs: Vec<PathBuf>,

    /// File written by the export key
    #[arg(short, long, default_value = "meshview-export.obj")]
    output: PathBuf,

    /// Initial zoom scale (clamped to 10..=500)
    #[arg(short, long, default_value_t = DEFAULT_SCALE / 5.0)]
    scale: f64,

    /// Handling of faces that reference missing vertices
    #[arg(long, value_enum, default_value = "lenient")]
    validation: ValidationArg,

    /// Start with auto-rotation enabled
    #[arg(long)]
    auto_rotate: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter used with --log-file
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValidationArg {
    Lenient,
    Reject,
    Drop,
}

impl From<ValidationArg> for Validation {
    fn from(arg: ValidationArg) -> Self {
        match arg {
            ValidationArg::Lenient => Validation::Lenient,
            ValidationArg::Reject => Validation::Reject,
            ValidationArg::Drop => Validation::Drop,
        }
    }
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    // The alternate screen owns stdout, so logs only go to a file
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_new(&cli.log_level)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let validation = Validation::from(cli.validation);
    let mut models = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        println!("Loading OBJ file: {}", path.display());
        let mesh = obj::load_with(path, validation)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        println!(
            "Loaded {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        tracing::info!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Loaded model"
        );
        models.push(Model {
            mesh,
            source: Some(path.clone()),
        });
    }

    println!("Starting terminal viewer (press Q to quit)...");

    let view = ViewState::new(RotationState::new(0.3, 0.3), cli.scale);
    let mut app = TerminalApp::new(models, view, cli.output)?;
    app.set_auto_rotate(cli.auto_rotate);
    app.run()?;

    Ok(())
}
