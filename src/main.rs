use anyhow::Result;
use auto_video_preview::component::PreviewGenerator;
use auto_video_preview::component::preview_generator::{BatchOutcome, BatchReport};
use auto_video_preview::config::Config;
use auto_video_preview::init;
use auto_video_preview::library::JsonItemStore;
use auto_video_preview::signal::setup_shutdown_signal;
use auto_video_preview::tools::{FfmpegEngine, FileLockService, ensure_directory_exists};
use console::style;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    init::init();
    let shutdown_signal = setup_shutdown_signal()?;

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::new()?,
    };
    ensure_directory_exists(&config.preview_dir)?;

    let generator = PreviewGenerator::new(
        &config,
        Arc::new(JsonItemStore::new(&config.library_file)),
        Arc::new(FfmpegEngine::new(&config.ffmpeg, Arc::clone(&shutdown_signal))),
        Arc::new(FileLockService::new(&config.preview_dir)),
        shutdown_signal,
    );

    match generator.run_batch()? {
        BatchOutcome::LockBusy => {
            println!("{}", style("已有預覽批次在執行，略過").yellow());
        }
        BatchOutcome::Completed(report) => print_summary(&report),
    }

    info!("Program exited normally");
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", style("=== 預覽產生摘要 ===").cyan().bold());
    println!("  總計: {} 個項目", report.total_items);
    println!("  成功: {} 個", style(report.successful).green());

    if report.skipped > 0 {
        println!("  跳過: {} 個", style(report.skipped).yellow());
    }

    if report.failed > 0 {
        println!("  失敗: {} 個", style(report.failed).red());
    }

    if report.interrupted {
        println!("  {}", style("已中斷，剩餘項目下次處理").yellow());
    }
}
