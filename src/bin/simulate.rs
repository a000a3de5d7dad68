// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 合成场景演示 (Synthetic Scene)
///
/// 用可复现的随机抖动生成检测: 路边的长椅和行人, 以及一辆从远处驶近的汽车,
/// 语音订阅者在独立线程里打印播报
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use navguard_rs::{BBox, Detection, EngineConfig, FrameInput, Tracker, UrgencyEngine};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const FRAME_WIDTH: f32 = 640.0;

/// 帧数上限 (约 15fps 下 18 小时)
const MAX_FRAMES: u64 = 1_000_000;

/// 第 `frame_id` 帧相对起点的时间偏移
fn frame_offset(frame_id: u64, fps: f32) -> Result<Duration> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("fps 必须为正数: {}", fps);
    }
    Duration::try_from_secs_f64(frame_id as f64 / fps as f64)
        .with_context(|| format!("第 {} 帧时间超出范围 (fps={})", frame_id, fps))
}

/// 演示参数
#[derive(Parser, Debug)]
#[command(author, version, about = "合成场景演示 - 紧急度引擎", long_about = None)]
struct Args {
    /// 帧数
    #[arg(short, long, default_value_t = 90, value_parser = clap::value_parser!(u64).range(1..=MAX_FRAMES))]
    frames: u64,

    /// 随机种子
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// 模拟帧率
    #[arg(long, default_value_t = 15.0)]
    fps: f32,

    /// 用户运动强度 (0 = 静止, 1 = 步行)
    #[arg(long, default_value_t = 1.0)]
    user_speed: f32,
}

/// 生成第 `frame` 帧的检测
fn synth_frame(rng: &mut StdRng, frame: u64, total: u64) -> Vec<Detection> {
    let mut jitter = |scale: f32| rng.gen_range(-scale..=scale);
    let mut detections = vec![
        Detection::new("bench", 0.8, BBox::new(520.0 + jitter(2.0), 300.0, 90.0, 60.0))
            .with_distance(3.8 + jitter(0.05)),
        Detection::new("person", 0.9, BBox::new(60.0 + jitter(3.0), 180.0, 50.0, 150.0))
            .with_distance(4.5 + jitter(0.1)),
    ];

    // 汽车: 从画面右侧远处向中心驶近
    let progress = frame as f32 / total.max(1) as f32;
    let distance = 9.0 - 8.0 * progress;
    let height = 60.0 + 240.0 * progress;
    let center_x = 480.0 - 150.0 * progress + jitter(2.0);
    detections.push(
        Detection::new(
            "car",
            0.85,
            BBox::new(center_x - height * 0.75, 300.0 - height / 2.0, height * 1.5, height),
        )
        .with_distance(distance + jitter(0.05)),
    );

    // 偶发漏检
    if rng.gen_bool(0.1) {
        detections.remove(1);
    }
    detections
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    // 提前校验最后一帧的时间偏移
    frame_offset(args.frames, args.fps)?;

    let config = EngineConfig::default();
    config.log_summary();

    let mut engine = UrgencyEngine::new(&config);
    let speech = engine.subscribe();

    // 语音订阅者: 只关心允许播报的事件
    let speaker = thread::spawn(move || {
        let mut spoken = 0usize;
        while let Ok(update) = speech.recv() {
            if let Some(event) = update.event.filter(|e| e.announce) {
                let tag = if event.cue.is_critical() { "🚨" } else { "🔈" };
                println!(
                    "{} [{:>4}] pan={:+.2} {}",
                    tag,
                    update.frame_id,
                    event.cue.pan,
                    event.cue.narration(update.path)
                );
                spoken += 1;
            }
        }
        spoken
    });

    let mut rng = StdRng::seed_from_u64(args.seed);
    let origin = Instant::now();

    info!("🚀 合成场景开始: {} 帧 @ {} fps", args.frames, args.fps);
    for frame_id in 0..args.frames {
        let detections = synth_frame(&mut rng, frame_id, args.frames);
        let timestamp = origin
            .checked_add(frame_offset(frame_id, args.fps)?)
            .context("帧时间戳溢出")?;
        let input = FrameInput::new(frame_id, timestamp, FRAME_WIDTH, detections)
            .with_user_speed(args.user_speed);
        engine.process_frame(&input);
    }

    let tracks = engine.tracker().track_count();
    engine.shutdown();
    let spoken = speaker.join().unwrap_or(0);
    info!(tracks, spoken, "✅ 合成场景结束");
    Ok(())
}
