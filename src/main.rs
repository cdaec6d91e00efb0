// src/main.rs

use painter::config::CONFIG;
use painter::display::HeadlessDisplay;
use painter::lang::Parser;
use painter::painter::{Loop, Operation};
use painter::surface::FramebufferFactory;

use anyhow::Context;
use log::{debug, info};
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Main entry point for the `painter` binary.
///
/// Usage: `painter [SCRIPT...]`. Each script is compiled as one pass on the
/// same parser; with no arguments, stdin is read as a single script.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting painter...");

    let scripts: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let config = &*CONFIG;

    let display = match &config.output.frame_dir {
        Some(dir) => HeadlessDisplay::with_frame_dir(dir),
        None => HeadlessDisplay::new(),
    };

    let mut painter = Loop::start(&config.painter, FramebufferFactory, display.clone())
        .context("Failed to start painter loop")?;

    let mut parser = Parser::new();
    if scripts.is_empty() {
        info!("Reading script from stdin");
        let ops = parser
            .parse(io::stdin().lock())
            .context("Failed to compile <stdin>")?;
        post_all(&painter, ops)?;
    } else {
        for path in &scripts {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            let ops = parser
                .parse(file)
                .with_context(|| format!("Failed to compile {}", path.display()))?;
            info!("Compiled {}", path.display());
            post_all(&painter, ops)?;
        }
    }

    painter
        .stop_and_wait()
        .context("Painter loop terminated abnormally")?;

    info!(
        "Painter finished. {} frame(s) presented.",
        display.frames_presented()
    );
    Ok(())
}

fn post_all(painter: &Loop, ops: Vec<Operation>) -> anyhow::Result<()> {
    debug!("Posting {} operations", ops.len());
    for op in ops {
        painter.post(op).context("Failed to post operation")?;
    }
    Ok(())
}
