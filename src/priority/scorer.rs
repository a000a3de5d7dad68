// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 紧急度评分 (纯函数, 无内部状态)
//!
//! 五项归一化子分数加权求和:
//!
//! | 因子 | 权重 |
//! |---|---|
//! | 距离 | 0.40 |
//! | 运动威胁 | 0.25 |
//! | 类别优先级 | 0.15 |
//! | 中心路径 | 0.15 |
//! | 碰撞风险 | 0.05 |
//!
//! 最终紧急度 = min(1, 加权和 × 用户速度系数 + 跟踪置信加成)

use std::fmt;

use serde::Serialize;

use super::tables::RiskProfile;
use crate::detection::types::TrackedObject;

// ========== 权重 ==========

pub const WEIGHT_DISTANCE: f32 = 0.40;
pub const WEIGHT_MOTION: f32 = 0.25;
pub const WEIGHT_CLASS: f32 = 0.15;
pub const WEIGHT_CENTER_PATH: f32 = 0.15;
pub const WEIGHT_COLLISION: f32 = 0.05;

// ========== 常量 ==========

/// 距离有效区间 (米)
const MIN_DISTANCE_M: f32 = 0.1;
const MAX_DISTANCE_M: f32 = 15.0;

/// 速度归一化基准 (像素/秒), 超过即视为满分
pub const MOTION_SPEED_NORM: f32 = 150.0;

/// 朝画面中心运动的放大系数
const TOWARD_CENTER_BOOST: f32 = 1.5;

/// 正在靠近的放大系数
const APPROACH_BOOST: f32 = 1.8;

/// 危急距离 (米)
pub const CRITICAL_DISTANCE_M: f32 = 1.5;

/// "快速接近" 的速度阈值 (像素/秒)
pub const FAST_SPEED_PX: f32 = 10.0;

/// "在正前方" 的中心路径分数阈值
pub const DIRECT_PATH_SCORE: f32 = 0.7;

/// 用户速度对紧急度的最大放大量
const MAX_SPEED_BONUS: f32 = 0.6;

/// 用户步行参考速度
const USER_SPEED_REF: f32 = 1.5;

/// 跟踪置信加成上限
const MAX_TRACKING_BOOST: f32 = 0.15;

// ========== 结果 ==========

/// 紧急原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyReason {
    CriticalProximity,
    FastApproaching,
    InDirectPath,
    PriorityObject,
}

impl UrgencyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyReason::CriticalProximity => "critical proximity",
            UrgencyReason::FastApproaching => "fast approaching",
            UrgencyReason::InDirectPath => "in direct path",
            UrgencyReason::PriorityObject => "priority object detected",
        }
    }
}

impl fmt::Display for UrgencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 子分数明细 (除距离外均在 [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FactorScores {
    pub distance: f32,
    pub motion: f32,
    pub class_priority: f32,
    pub center_path: f32,
    pub collision: f32,
}

impl FactorScores {
    pub fn weighted_sum(&self) -> f32 {
        self.distance * WEIGHT_DISTANCE
            + self.motion * WEIGHT_MOTION
            + self.class_priority * WEIGHT_CLASS
            + self.center_path * WEIGHT_CENTER_PATH
            + self.collision * WEIGHT_COLLISION
    }
}

/// 评分结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UrgencyScore {
    /// 紧急度 [0, 1]
    pub urgency: f32,
    pub reason: UrgencyReason,
    pub factors: FactorScores,
}

// ========== 子分数 ==========

/// 距离分数: 越近越高
///
/// 1米处为1.0; 更近时继续增大 (0.1米下限处约1.82), 由最终截断兜底
pub fn distance_score(distance_m: f32) -> f32 {
    let d = if distance_m.is_finite() {
        distance_m.clamp(MIN_DISTANCE_M, MAX_DISTANCE_M)
    } else {
        MAX_DISTANCE_M
    };
    1.0 / (d * 0.5 + 0.5)
}

/// 目标中心相对画面中心的水平偏移, 按画面宽度归一化 (带符号, 约 [-0.5, 0.5])
pub fn horizontal_offset(center_x: f32, frame_width: f32) -> f32 {
    let width = safe_width(frame_width);
    let offset = (center_x - width / 2.0) / width;
    if offset.is_finite() {
        offset
    } else {
        0.5
    }
}

/// 中心路径分数: 分段阶梯函数
pub fn center_path_score(center_x: f32, frame_width: f32) -> f32 {
    let offset = horizontal_offset(center_x, frame_width).abs();
    if offset <= 0.15 {
        1.0
    } else if offset <= 0.25 {
        0.7
    } else if offset <= 0.35 {
        0.4
    } else {
        0.1
    }
}

/// 运动威胁分数
pub fn motion_score(track: &TrackedObject, frame_width: f32, motion_weight: f32) -> f32 {
    let speed = track.speed();
    if !speed.is_finite() {
        return 0.0;
    }

    let mut threat = (speed / MOTION_SPEED_NORM).min(1.0) * motion_weight;

    // 水平速度与偏移方向相反 → 正在向画面中心移动
    let offset = horizontal_offset(track.center.x, frame_width);
    if offset * track.velocity.vx < 0.0 {
        threat *= TOWARD_CENTER_BOOST;
    }
    if track.is_approaching() {
        threat *= APPROACH_BOOST;
    }

    threat.clamp(0.0, 1.0)
}

// ========== 评分 ==========

/// 计算单个跟踪对象的紧急度
///
/// - `frame_width`: 画面宽度 (像素)
/// - `user_speed`: 用户运动强度 (0 = 静止, 1 = 步行)
pub fn score(track: &TrackedObject, frame_width: f32, user_speed: f32) -> UrgencyScore {
    let risk = RiskProfile::for_label(&track.detection.label);
    let distance = track.detection.distance_or_default();

    let factors = FactorScores {
        distance: distance_score(distance),
        motion: motion_score(track, frame_width, risk.motion_weight),
        class_priority: risk.priority,
        center_path: center_path_score(track.center.x, frame_width),
        collision: risk.collision,
    };

    let user_speed = if user_speed.is_finite() {
        user_speed.max(0.0)
    } else {
        0.0
    };
    let speed_multiplier = 1.0 + (user_speed / USER_SPEED_REF).min(MAX_SPEED_BONUS);
    let tracking_boost = (track.frame_count as f32 / 10.0).min(MAX_TRACKING_BOOST);

    let raw = factors.weighted_sum() * speed_multiplier + tracking_boost;
    let urgency = if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let reason = if distance < CRITICAL_DISTANCE_M {
        UrgencyReason::CriticalProximity
    } else if track.speed() > FAST_SPEED_PX && track.is_approaching() {
        UrgencyReason::FastApproaching
    } else if factors.center_path > DIRECT_PATH_SCORE {
        UrgencyReason::InDirectPath
    } else {
        UrgencyReason::PriorityObject
    };

    UrgencyScore {
        urgency,
        reason,
        factors,
    }
}

fn safe_width(frame_width: f32) -> f32 {
    if frame_width.is_finite() {
        frame_width.max(1.0)
    } else {
        1.0
    }
}
