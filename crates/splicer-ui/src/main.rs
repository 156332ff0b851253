// crates/splicer-ui/src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

use anyhow::Context as _;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    helpers::log::init();
    log::info!("[app] Splicer {} starting", env!("CARGO_PKG_VERSION"));

    ffmpeg_the_third::init().context("FFmpeg init failed")?;

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("Splicer - Video Combiner")
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([480.0, 320.0])
            .with_drag_and_drop(true)
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Splicer",
        native_options,
        Box::new(|cc| Ok(Box::new(app::SplicerApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
