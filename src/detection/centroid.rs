// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 中心点贪心跟踪器
//! Greedy same-label nearest-centre tracker
//!
//! 核心思想:
//! 1. 检测按输入顺序逐个处理
//! 2. 只在同类别、本帧尚未被认领的轨迹里找最近中心点
//! 3. 距离小于阈值才接受, 认领后立即锁定 (贪心, 非全局最优)
//! 4. 超出时间预算未匹配的轨迹被删除, 重新出现的目标分配新ID

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use tracing::{debug, trace};

use super::tracker::{frame_dt, Tracker};
use super::types::{Detection, TrackedObject};
use crate::config::TrackerParams;

/// 中心点追踪器
pub struct CentroidTracker {
    /// 跟踪表 (ID → 对象), BTreeMap 保证按ID升序遍历
    tracks: BTreeMap<u64, TrackedObject>,

    /// 下一个分配的ID
    next_id: u64,

    /// 上一次更新的时间戳
    last_update: Option<Instant>,

    params: TrackerParams,
}

impl CentroidTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
            last_update: None,
            params,
        }
    }

    /// 在未认领的同类别轨迹中找最近的一个
    fn nearest_unclaimed(&self, detection: &Detection, claimed: &HashSet<u64>) -> Option<u64> {
        let center = detection.center();
        let mut best: Option<(u64, f32)> = None;

        for (&id, track) in &self.tracks {
            if claimed.contains(&id) || track.detection.label != detection.label {
                continue;
            }
            let distance = track.center.distance(&center);
            // 严格小于: 距离相同时先出现的 (ID小的) 胜出
            if distance < self.params.match_distance_px
                && best.map_or(true, |(_, best_distance)| distance < best_distance)
            {
                best = Some((id, distance));
            }
        }

        best.map(|(id, _)| id)
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new(TrackerParams::default())
    }
}

impl Tracker for CentroidTracker {
    fn update(&mut self, detections: &[Detection], now: Instant) {
        // 1. 帧间隔
        let dt = frame_dt(
            self.last_update,
            now,
            self.params.default_dt_secs,
            self.params.min_dt_secs,
        );
        self.last_update = Some(self.last_update.map_or(now, |last| last.max(now)));

        // 2. 贪心匹配: 检测按顺序认领轨迹
        let mut claimed: HashSet<u64> = HashSet::with_capacity(detections.len());

        for detection in detections {
            match self.nearest_unclaimed(detection, &claimed) {
                Some(id) => {
                    claimed.insert(id);
                    if let Some(track) = self.tracks.get_mut(&id) {
                        // 3. 匹配成功: EMA更新速度
                        track.absorb(
                            detection.clone(),
                            now,
                            dt,
                            self.params.velocity_alpha,
                            self.params.trajectory_len,
                        );
                        trace!(
                            id,
                            label = %track.detection.label,
                            vx = track.velocity.vx,
                            vy = track.velocity.vy,
                            "轨迹更新"
                        );
                    }
                }
                None => {
                    // 4. 未匹配 → 新建轨迹
                    let id = self.next_id;
                    self.next_id += 1;
                    claimed.insert(id);
                    debug!(id, label = %detection.label, "🆕 新建轨迹");
                    self.tracks
                        .insert(id, TrackedObject::new(id, detection.clone(), now));
                }
            }
        }

        // 5. 删除丢失太久的轨迹 (时间预算 = 最大丢失帧数 × 当前帧间隔)
        let budget_ms = self.params.max_missed_frames as f32 * dt * 1000.0;
        self.tracks.retain(|id, track| {
            if claimed.contains(id) {
                return true;
            }
            let missing_ms = now.saturating_duration_since(track.last_seen).as_secs_f32() * 1000.0;
            let keep = missing_ms <= budget_ms;
            if !keep {
                debug!(
                    id,
                    label = %track.detection.label,
                    missing_ms,
                    budget_ms,
                    "🗑️ 轨迹过期删除"
                );
            }
            keep
        });
    }

    fn tracks(&self) -> Box<dyn Iterator<Item = &TrackedObject> + '_> {
        Box::new(self.tracks.values())
    }

    fn get(&self, id: u64) -> Option<&TrackedObject> {
        self.tracks.get(&id)
    }

    fn reset(&mut self) {
        self.tracks.clear();
        self.last_update = None;
    }

    fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
