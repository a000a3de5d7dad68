// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 事件选择器 (Selector)
//! 职责: 对所有活跃轨迹评分 → 取最高分 → 远距/下限过滤

use serde::Serialize;
use tracing::trace;

use super::scorer::{self, center_path_score, FactorScores, UrgencyReason, DIRECT_PATH_SCORE, FAST_SPEED_PX};
use crate::announce::narration::SpeechCue;
use crate::config::SelectorParams;
use crate::detection::types::{Detection, TrackedObject, TrackingInfo};

/// 路径阻塞判定距离 (米)
pub const PATH_BLOCK_DISTANCE_M: f32 = 3.0;

/// 选中的事件 (每帧临时生成, 不持久)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedEvent {
    pub detection: Detection,
    /// 紧急度 [0, 1]
    pub urgency: f32,
    pub reason: UrgencyReason,
    pub factors: FactorScores,
    pub tracking: TrackingInfo,
    pub cue: SpeechCue,
    /// 是否允许语音播报 (由播报闸门决定, 不影响事件本身的发布)
    pub announce: bool,
}

/// 前方路径状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Clear,
    Blocked,
}

/// 事件选择器
#[derive(Debug, Clone, Default)]
pub struct Selector {
    params: SelectorParams,
}

impl Selector {
    pub fn new(params: SelectorParams) -> Self {
        Self { params }
    }

    /// 选出最紧急的一个目标
    ///
    /// 紧急度相同时先遍历到的胜出; 没有轨迹或全部被过滤时返回 None
    pub fn select<'a, I>(&self, tracks: I, frame_width: f32, user_speed: f32) -> Option<SelectedEvent>
    where
        I: IntoIterator<Item = &'a TrackedObject>,
    {
        let mut best: Option<(&TrackedObject, scorer::UrgencyScore)> = None;

        for track in tracks {
            let result = scorer::score(track, frame_width, user_speed);
            trace!(
                id = track.id,
                label = %track.detection.label,
                urgency = result.urgency,
                reason = %result.reason,
                "评分"
            );
            if best
                .as_ref()
                .map_or(true, |(_, best_score)| result.urgency > best_score.urgency)
            {
                best = Some((track, result));
            }
        }

        let (track, result) = best?;

        // 远处且不够紧急: 不值得提醒
        let distance = track.detection.distance_or_default();
        if distance > self.params.far_distance_m && result.urgency < self.params.far_min_urgency {
            trace!(id = track.id, distance, urgency = result.urgency, "远距离低紧急度, 过滤");
            return None;
        }
        if result.urgency < self.params.urgency_floor {
            trace!(id = track.id, urgency = result.urgency, "低于全局下限, 过滤");
            return None;
        }

        let moving = track.speed() > FAST_SPEED_PX && !track.is_approaching();

        Some(SelectedEvent {
            detection: track.detection.clone(),
            urgency: result.urgency,
            reason: result.reason,
            factors: result.factors,
            tracking: track.tracking_info(),
            cue: SpeechCue::new(
                &track.detection.label,
                result.reason,
                result.urgency,
                moving,
                track.center.x,
                frame_width,
            ),
            announce: false,
        })
    }
}

/// 判断前方路径是否被阻塞
///
/// 任一目标位于正前方通道且距离小于 PATH_BLOCK_DISTANCE_M 即视为阻塞
pub fn path_status<'a, I>(tracks: I, frame_width: f32) -> PathStatus
where
    I: IntoIterator<Item = &'a TrackedObject>,
{
    let blocked = tracks.into_iter().any(|track| {
        center_path_score(track.center.x, frame_width) >= DIRECT_PATH_SCORE
            && track.detection.distance_or_default() < PATH_BLOCK_DISTANCE_M
    });
    if blocked {
        PathStatus::Blocked
    } else {
        PathStatus::Clear
    }
}
