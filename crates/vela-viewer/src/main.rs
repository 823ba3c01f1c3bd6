use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use vela_engine::logging::{init_logging, LoggingConfig};
use vela_engine::window::{Runtime, RuntimeConfig};

mod viewer;

use viewer::Viewer;

/// Fly an FPS camera through a glTF scene.
///
/// Right click toggles mouse look, WASD/QE move, Shift speeds up, the wheel
/// zooms and Escape quits.
#[derive(Parser, Debug, Clone)]
#[command(name = "vela-viewer", version)]
pub struct Args {
    /// glTF scene to load. Without one a lit cube over a floor is shown.
    pub scene: Option<PathBuf>,

    /// Directory holding the material shaders.
    #[arg(long, default_value = vela_engine::material::SHADER_DIR)]
    pub shaders: PathBuf,

    /// Uniform scale applied to the loaded scene.
    #[arg(long, default_value_t = 0.1)]
    pub scale: f32,
}

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());
    let args = Args::parse();

    let config = RuntimeConfig {
        title: "vela viewer".to_string(),
        ..RuntimeConfig::default()
    };

    let status = Runtime::run(config, Viewer::new(args));
    if !status.is_success() {
        log::error!("viewer exited with {status:?}");
    }
    status.into()
}
