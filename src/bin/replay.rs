// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检测日志回放 (Detection Replay)
///
/// 读取 JSON Lines 检测日志 (每行一帧 `FrameRecord`), 逐帧送入紧急度引擎,
/// 打印允许播报的提示, 并把每帧的 `UrgencyUpdate` 写成 JSON Lines
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use navguard_rs::{gen_time_string, EngineConfig, FrameRecord, UrgencyEngine};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// 回放参数
#[derive(Parser, Debug)]
#[command(author, version, about = "检测日志回放 - 紧急度引擎离线评估", long_about = None)]
struct Args {
    /// 检测日志 (JSON Lines)
    #[arg(short, long)]
    input: PathBuf,

    /// 引擎配置文件 (不存在时写入默认配置)
    #[arg(short, long, default_value = "navguard_config.json")]
    config: PathBuf,

    /// 输出文件, 默认 runs/replay-<时间>.jsonl
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();

    let config = EngineConfig::load(&args.config);
    config.log_summary();

    let output = match args.output {
        Some(path) => path,
        None => {
            std::fs::create_dir_all("runs").context("无法创建 runs 目录")?;
            PathBuf::from(format!("runs/replay-{}.jsonl", gen_time_string("-")))
        }
    };

    let reader = BufReader::new(
        File::open(&args.input).with_context(|| format!("无法打开检测日志 {}", args.input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(&output).with_context(|| format!("无法创建输出文件 {}", output.display()))?,
    );

    info!("🚀 回放开始: {}", args.input.display());

    let mut engine = UrgencyEngine::new(&config);
    let origin = Instant::now();
    let mut frame_id = 0u64;
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("读取第 {} 行失败", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FrameRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("⚠️  第 {} 行解析失败: {}", line_no + 1, e);
                skipped += 1;
                continue;
            }
        };

        let input = record.into_input(frame_id, origin);
        frame_id += 1;

        if let Some(update) = engine.process_frame(&input) {
            if let Some(event) = update.event.as_ref().filter(|e| e.announce) {
                println!(
                    "[{:>6}] {:<8} {:.2}  {}",
                    update.frame_id,
                    if event.cue.is_critical() { "CRITICAL" } else { "notice" },
                    event.urgency,
                    event.cue.narration(update.path)
                );
            }
            serde_json::to_writer(&mut writer, &update)?;
            writer.write_all(b"\n")?;
        }
    }

    writer.flush()?;
    info!(
        frames = engine.frame_count(),
        announced = engine.announced_count(),
        skipped,
        "✅ 回放结束, 结果写入 {}",
        output.display()
    );
    engine.shutdown();
    Ok(())
}
