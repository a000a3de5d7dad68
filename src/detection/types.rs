// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 导航检测数据结构定义
//! Data structures shared by the tracker, scorer and selector

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

// ========== 公共常量 ==========

/// 检测未携带距离时使用的默认距离 (米)
pub const DEFAULT_DISTANCE_M: f32 = 5.0;

/// 接近判定: 距离变化率阈值 (米/秒, 负数表示靠近)
pub const APPROACH_RANGE_RATE: f32 = -0.05;

/// 接近判定: 无距离信息时, 边界框高度增长率阈值 (像素/秒)
pub const APPROACH_HEIGHT_RATE: f32 = 1.0;

// ========== 几何类型 ==========

/// 二维点 (像素坐标)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 欧氏距离
    pub fn distance(&self, other: &Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// 速度向量 (像素/秒)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// 检测框 (像素空间, left/top/width/height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// 高度, 最小1像素 (防止除零)
    pub fn safe_height(&self) -> f32 {
        if self.height.is_finite() {
            self.height.max(1.0)
        } else {
            1.0
        }
    }
}

// ========== 检测结果 ==========

/// 单帧检测 (感知管线 → 追踪器), 由调用方持有, 引擎只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox,
    /// 单目测距结果 (米), 可选
    #[serde(default)]
    pub distance: Option<f32>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
            distance: None,
        }
    }

    pub fn with_distance(mut self, distance_m: f32) -> Self {
        self.distance = Some(distance_m);
        self
    }

    pub fn center(&self) -> Point2 {
        self.bbox.center()
    }

    /// 有效距离: 缺失或非法时回退到 DEFAULT_DISTANCE_M
    pub fn distance_or_default(&self) -> f32 {
        match self.distance {
            Some(d) if d.is_finite() => d,
            _ => DEFAULT_DISTANCE_M,
        }
    }
}

// ========== 跟踪对象 ==========

/// 跟踪对象 (只存在于追踪器内部的表中, 按ID索引)
#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// 唯一跟踪ID (单调递增, 永不复用)
    pub id: u64,

    /// 最近一次匹配的检测
    pub detection: Detection,

    /// 中心点 (像素)
    pub center: Point2,

    /// 平滑速度 (像素/秒)
    pub velocity: Velocity,

    /// 距离变化率 (米/秒), 需要连续两帧都有距离
    pub range_rate: Option<f32>,

    /// 边界框高度增长率 (像素/秒)
    pub height_rate: f32,

    pub first_seen: Instant,
    pub last_seen: Instant,

    /// 匹配帧数 (跟踪置信度)
    pub frame_count: u32,

    /// 历史轨迹 (中心点)
    pub trajectory: VecDeque<Point2>,
}

impl TrackedObject {
    pub fn new(id: u64, detection: Detection, now: Instant) -> Self {
        let center = detection.center();
        let mut trajectory = VecDeque::new();
        trajectory.push_back(center);

        Self {
            id,
            detection,
            center,
            velocity: Velocity::default(),
            range_rate: None,
            height_rate: 0.0,
            first_seen: now,
            last_seen: now,
            frame_count: 1,
            trajectory,
        }
    }

    /// 融合新的匹配检测 (指数滑动平均更新速度)
    ///
    /// `dt` 必须已经过下限保护 (> 0)
    pub(crate) fn absorb(
        &mut self,
        detection: Detection,
        now: Instant,
        dt: f32,
        alpha: f32,
        trajectory_len: usize,
    ) {
        let center = detection.center();
        let ema = |raw: f32, old: f32| alpha * raw + (1.0 - alpha) * old;

        self.velocity = Velocity::new(
            ema((center.x - self.center.x) / dt, self.velocity.vx),
            ema((center.y - self.center.y) / dt, self.velocity.vy),
        );

        let growth = (detection.bbox.safe_height() - self.detection.bbox.safe_height()) / dt;
        self.height_rate = ema(growth, self.height_rate);

        self.range_rate = match (self.detection.distance, detection.distance) {
            (Some(prev), Some(cur)) if prev.is_finite() && cur.is_finite() => {
                Some(ema((cur - prev) / dt, self.range_rate.unwrap_or(0.0)))
            }
            // 测距中断时保留上一次估计
            _ => self.range_rate,
        };

        self.center = center;
        self.detection = detection;
        self.last_seen = now;
        self.frame_count = self.frame_count.saturating_add(1);

        self.trajectory.push_back(center);
        while self.trajectory.len() > trajectory_len.max(1) {
            self.trajectory.pop_front();
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.speed()
    }

    /// 是否正在靠近用户
    ///
    /// 有测距时看距离变化率, 否则看边界框是否在变大
    pub fn is_approaching(&self) -> bool {
        match self.range_rate {
            Some(rate) => rate < APPROACH_RANGE_RATE,
            None => self.height_rate > APPROACH_HEIGHT_RATE,
        }
    }

    /// 生成跟踪信息快照
    pub fn tracking_info(&self) -> TrackingInfo {
        TrackingInfo {
            track_id: self.id,
            frame_count: self.frame_count,
            center: self.center,
            velocity: self.velocity,
            approaching: self.is_approaching(),
            tracked_ms: self
                .last_seen
                .saturating_duration_since(self.first_seen)
                .as_secs_f64()
                * 1000.0,
            trajectory: self.trajectory.iter().copied().collect(),
        }
    }
}

/// 跟踪信息快照 (随输出事件发布)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingInfo {
    pub track_id: u64,
    pub frame_count: u32,
    pub center: Point2,
    pub velocity: Velocity,
    pub approaching: bool,
    /// 从首次出现到最近一次匹配的时长
    pub tracked_ms: f64,
    pub trajectory: Vec<Point2>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn person_at(x: f32, h: f32) -> Detection {
        Detection::new("person", 0.9, BBox::new(x, 100.0, 40.0, h))
    }

    #[test]
    fn test_bbox_center() {
        let bbox = BBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.center(), Point2::new(60.0, 45.0));
        assert_eq!(bbox.right(), 110.0);
        assert_eq!(bbox.bottom(), 70.0);
    }

    #[test]
    fn test_safe_height_floor() {
        assert_eq!(BBox::new(0.0, 0.0, 5.0, 0.0).safe_height(), 1.0);
        assert_eq!(BBox::new(0.0, 0.0, 5.0, f32::NAN).safe_height(), 1.0);
        assert_eq!(BBox::new(0.0, 0.0, 5.0, 30.0).safe_height(), 30.0);
    }

    #[test]
    fn test_distance_default() {
        let det = person_at(0.0, 80.0);
        assert_eq!(det.distance_or_default(), DEFAULT_DISTANCE_M);
        assert_eq!(det.clone().with_distance(2.5).distance_or_default(), 2.5);
        assert_eq!(
            det.with_distance(f32::INFINITY).distance_or_default(),
            DEFAULT_DISTANCE_M
        );
    }

    #[test]
    fn test_absorb_velocity_ema() {
        let t0 = Instant::now();
        let mut track = TrackedObject::new(1, person_at(0.0, 80.0), t0);

        // 0.1秒内右移10像素 → 原始速度100px/s, α=0.3 → 30px/s
        track.absorb(person_at(10.0, 80.0), t0 + Duration::from_millis(100), 0.1, 0.3, 30);
        assert!((track.velocity.vx - 30.0).abs() < 1e-3);
        assert!(track.velocity.vy.abs() < 1e-6);
        assert_eq!(track.frame_count, 2);
        assert_eq!(track.trajectory.len(), 2);
    }

    #[test]
    fn test_approaching_by_range_rate() {
        let t0 = Instant::now();
        let mut track = TrackedObject::new(1, person_at(0.0, 80.0).with_distance(3.0), t0);
        track.absorb(
            person_at(0.0, 80.0).with_distance(2.5),
            t0 + Duration::from_millis(100),
            0.1,
            0.3,
            30,
        );
        assert!(track.range_rate.unwrap() < 0.0);
        assert!(track.is_approaching());
    }

    #[test]
    fn test_approaching_by_bbox_growth() {
        let t0 = Instant::now();
        let mut track = TrackedObject::new(1, person_at(0.0, 80.0), t0);
        assert!(!track.is_approaching());
        track.absorb(person_at(0.0, 100.0), t0 + Duration::from_millis(100), 0.1, 0.3, 30);
        assert!(track.is_approaching());
    }

    #[test]
    fn test_trajectory_is_bounded() {
        let t0 = Instant::now();
        let mut track = TrackedObject::new(1, person_at(0.0, 80.0), t0);
        for i in 1..20 {
            track.absorb(
                person_at(i as f32, 80.0),
                t0 + Duration::from_millis(33 * i),
                0.033,
                0.3,
                5,
            );
        }
        assert_eq!(track.trajectory.len(), 5);
        assert_eq!(track.trajectory.back().unwrap().x, 19.0 + 20.0);
    }
}
