//! Lumen Sandbox
//!
//! Run with: cargo run -p lumen_sandbox -- [scene.toml] [frames]

use lumen_sandbox::{App, Result, SandboxConfig, SandboxError};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SandboxConfig::load(&path)?,
        None => {
            log::info!("No scene given, using the builtin scene");
            SandboxConfig::builtin()?
        }
    };
    let frames = match args.next() {
        Some(text) => text
            .parse::<u32>()
            .map_err(|e| SandboxError::InvalidArgument(format!("frame count '{}': {}", text, e)))?,
        None => config.frames,
    };

    let mut app = App::new(&config)?;
    if let Some(report) = app.run(frames) {
        log::info!(
            "Frame {}: scene {:?}, overlay {:?}, {} debug segments",
            report.frame,
            report.draw,
            report.overlay,
            report.debug_segments
        );
    }
    app.shutdown();
    Ok(())
}
