// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod gui;
use anyhow::Context as _;
use eframe::egui;
use live_grapher::config::{PanelSettings, PipelineConfig, SETTINGS_FILE};
use live_grapher::engine;
use live_grapher::telemetry::ChannelPipeline;
use live_grapher::types::StaticAccess;
use log::warn;
// 入口函数
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut settings = PanelSettings::load_or_default(SETTINGS_FILE);
    let pipeline = match ChannelPipeline::new(settings.pipeline.clone()) {
        Ok(p) => p,
        Err(err) => {
            warn!("falling back to default pipeline settings: {err}");
            settings.pipeline = PipelineConfig::default();
            ChannelPipeline::new(settings.pipeline.clone()).context("default pipeline")?
        }
    };
    let pipeline = engine::shared(pipeline);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([960.0, 600.0])
        .with_title("Live Grapher");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Live Grapher",
        options,
        Box::new(move |_cc| {
            Box::new(gui::LiveGrapherApp::new(
                pipeline,
                settings,
                SETTINGS_FILE.into(),
                Box::new(StaticAccess::from_env()),
            ))
        }),
    )
    .map_err(|err| anyhow::anyhow!("ui failed: {err}"))
}
