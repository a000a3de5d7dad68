// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 紧急度引擎 (Urgency Engine)
/// 职责: 检测 → 追踪 → 评分 → 选择 → 播报闸门 → 发布UrgencyUpdate消息
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{FrameInput, UrgencyUpdate};
use crate::announce::gate::AnnouncementGate;
use crate::config::EngineConfig;
use crate::detection::centroid::CentroidTracker;
use crate::detection::tracker::Tracker;
use crate::priority::selector::{path_status, Selector};
use crate::xbus::{Bus, Subscription};

/// 每隔多少帧打印一次统计
const STATS_INTERVAL: u64 = 60;

pub struct UrgencyEngine<T: Tracker = CentroidTracker> {
    tracker: T,
    selector: Selector,
    gate: AnnouncementGate,
    bus: Bus<UrgencyUpdate>,
    closed: bool,

    // 统计
    count: u64,
    announced: u64,
    last: Instant,
    current_fps: f64,
}

impl UrgencyEngine<CentroidTracker> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_tracker(config, CentroidTracker::new(config.tracker.clone()))
    }
}

impl<T: Tracker> UrgencyEngine<T> {
    /// 使用自定义追踪器
    pub fn with_tracker(config: &EngineConfig, tracker: T) -> Self {
        Self {
            tracker,
            selector: Selector::new(config.selector.clone()),
            gate: AnnouncementGate::new(config.gate.clone()),
            bus: Bus::new(config.bus_capacity),
            closed: false,
            count: 0,
            announced: 0,
            last: Instant::now(),
            current_fps: 0.0,
        }
    }

    pub fn subscribe(&mut self) -> Subscription<UrgencyUpdate> {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.bus.unsubscribe(id)
    }

    /// 处理一帧
    ///
    /// 返回本帧的更新 (同时已广播给所有订阅者); 引擎关闭后返回 None
    pub fn process_frame(&mut self, frame: &FrameInput) -> Option<UrgencyUpdate> {
        debug_assert!(!self.closed, "process_frame called after shutdown");
        if self.closed {
            warn!(frame_id = frame.frame_id, "⚠️  引擎已关闭, 忽略该帧");
            return None;
        }

        let start = Instant::now();

        // 1. 追踪
        self.tracker.update(&frame.detections, frame.timestamp);

        // 2. 路径状态
        let path = path_status(self.tracker.tracks(), frame.frame_width);

        // 3. 选择最紧急目标
        let mut event = self
            .selector
            .select(self.tracker.tracks(), frame.frame_width, frame.user_speed);

        // 4. 播报闸门: 只决定能否说话, 事件照常发布
        if let Some(event) = event.as_mut() {
            event.announce =
                self.gate
                    .should_announce(&event.detection.label, event.urgency, frame.timestamp);
            if event.announce {
                self.announced += 1;
                info!(
                    frame_id = frame.frame_id,
                    track_id = event.tracking.track_id,
                    urgency = event.urgency,
                    reason = %event.reason,
                    critical = event.cue.is_critical(),
                    "🔊 {}",
                    event.cue.narration(path)
                );
            }
        }

        let update = UrgencyUpdate {
            frame_id: frame.frame_id,
            event,
            path,
            track_count: self.tracker.track_count(),
            process_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        // 5. 发布
        self.bus.post(update.clone());

        // 6. 统计
        self.count += 1;
        if self.count % STATS_INTERVAL == 0 {
            let elapsed = self.last.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                self.current_fps = STATS_INTERVAL as f64 / elapsed;
            }
            self.last = Instant::now();
            debug!(
                frames = self.count,
                fps = self.current_fps,
                ms = update.process_ms,
                tracks = update.track_count,
                announced = self.announced,
                subscribers = self.bus.subscriber_count(),
                "📊 引擎统计"
            );
        }

        Some(update)
    }

    /// 关闭引擎 (幂等): 清空跟踪表, 关闭输出通道
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.tracker.reset();
        self.gate.reset();
        self.bus.close();
        info!(frames = self.count, announced = self.announced, "🛑 紧急度引擎已关闭");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// 已处理帧数
    pub fn frame_count(&self) -> u64 {
        self.count
    }

    /// 已允许播报的次数
    pub fn announced_count(&self) -> u64 {
        self.announced
    }
}

impl<T: Tracker> Drop for UrgencyEngine<T> {
    fn drop(&mut self) {
        self.bus.close();
    }
}
