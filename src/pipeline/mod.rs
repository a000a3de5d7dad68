// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 紧急度处理流水线 (Urgency Pipeline)
///
/// 单线程, 调用驱动: 感知管线每帧调用一次 `UrgencyEngine::process_frame`,
/// 结果通过XBus广播给语音/UI等订阅者
pub mod engine;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::detection::types::Detection;
use crate::priority::selector::{PathStatus, SelectedEvent};

pub use engine::UrgencyEngine;

// ========== XBus消息类型定义 ==========

/// 单帧输入 (感知管线 → 引擎)
#[derive(Clone, Debug)]
pub struct FrameInput {
    pub frame_id: u64, // 帧序号
    pub timestamp: Instant,
    pub frame_width: f32,
    /// 用户运动强度 (0 = 静止, 1 = 步行)
    pub user_speed: f32,
    pub detections: Vec<Detection>,
}

impl FrameInput {
    pub fn new(frame_id: u64, timestamp: Instant, frame_width: f32, detections: Vec<Detection>) -> Self {
        Self {
            frame_id,
            timestamp,
            frame_width,
            user_speed: 0.0,
            detections,
        }
    }

    pub fn with_user_speed(mut self, user_speed: f32) -> Self {
        self.user_speed = user_speed;
        self
    }
}

/// 紧急度更新 (引擎 → 订阅者), 每帧发布一次
///
/// `event` 为 None 表示本帧没有值得提醒的目标
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UrgencyUpdate {
    pub frame_id: u64,
    pub event: Option<SelectedEvent>,
    pub path: PathStatus,
    pub track_count: usize,
    pub process_ms: f64,
}

impl UrgencyUpdate {
    /// 本帧是否允许语音播报
    pub fn should_speak(&self) -> bool {
        self.event.as_ref().is_some_and(|e| e.announce)
    }
}

/// 检测日志中的一行 (JSON Lines), 时间戳为相对毫秒
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub t_ms: u64,
    pub frame_width: f32,
    #[serde(default)]
    pub user_speed: f32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl FrameRecord {
    /// 以 `origin` 为零点换算成引擎输入
    pub fn into_input(self, frame_id: u64, origin: Instant) -> FrameInput {
        FrameInput {
            frame_id,
            timestamp: origin + Duration::from_millis(self.t_ms),
            frame_width: self.frame_width,
            user_speed: self.user_speed,
            detections: self.detections,
        }
    }
}
