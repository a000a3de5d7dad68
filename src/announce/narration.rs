// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 语音提示 (Speech cue)
//!
//! 把选中的事件映射成语音子系统需要的东西: 优先级档位, 方位, 立体声声像, 播报短语

use std::fmt;

use serde::Serialize;

use crate::priority::scorer::{horizontal_offset, UrgencyReason};
use crate::priority::selector::PathStatus;

/// 紧急度达到该值的事件应打断当前播报
pub const CRITICAL_URGENCY: f32 = 0.85;

/// 归一化偏移 (相对半幅宽) 超过该值视为在左/右侧
const SIDE_THRESHOLD: f32 = 0.3;

/// 语音优先级档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechPriority {
    /// 打断当前播报
    Critical,
    Normal,
}

impl SpeechPriority {
    pub fn from_urgency(urgency: f32) -> Self {
        if urgency >= CRITICAL_URGENCY {
            SpeechPriority::Critical
        } else {
            SpeechPriority::Normal
        }
    }
}

/// 方位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Ahead,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "left",
            Direction::Ahead => "ahead",
            Direction::Right => "right",
        })
    }
}

/// 立体声声像 [-1 (左), 1 (右)]
pub fn spatial_pan(center_x: f32, frame_width: f32) -> f32 {
    (horizontal_offset(center_x, frame_width) * 2.0).clamp(-1.0, 1.0)
}

pub fn direction_of(center_x: f32, frame_width: f32) -> Direction {
    let pan = spatial_pan(center_x, frame_width);
    if pan < -SIDE_THRESHOLD {
        Direction::Left
    } else if pan > SIDE_THRESHOLD {
        Direction::Right
    } else {
        Direction::Ahead
    }
}

/// 播报短语
///
/// `moving`: 目标在移动但没有靠近, 只影响普通优先目标的措辞
pub fn compose_phrase(label: &str, reason: UrgencyReason, direction: Direction, moving: bool) -> String {
    let place = match direction {
        Direction::Ahead => "ahead".to_string(),
        side => format!("on your {}", side),
    };
    match reason {
        UrgencyReason::CriticalProximity => format!("{} very close {}", label, place),
        UrgencyReason::FastApproaching => match direction {
            Direction::Ahead => format!("{} approaching ahead", label),
            side => format!("{} approaching from your {}", label, side),
        },
        UrgencyReason::InDirectPath => format!("{} in path ahead", label),
        UrgencyReason::PriorityObject if moving => format!("{} moving {}", label, place),
        UrgencyReason::PriorityObject => format!("{} {}", label, place),
    }
}

/// 路径状态附加语
pub fn path_clause(path: PathStatus) -> &'static str {
    match path {
        PathStatus::Clear => "the way ahead is clear",
        PathStatus::Blocked => "obstacle in path",
    }
}

/// 语音提示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechCue {
    pub priority: SpeechPriority,
    pub direction: Direction,
    pub pan: f32,
    pub phrase: String,
}

impl SpeechCue {
    pub fn new(
        label: &str,
        reason: UrgencyReason,
        urgency: f32,
        moving: bool,
        center_x: f32,
        frame_width: f32,
    ) -> Self {
        let direction = direction_of(center_x, frame_width);
        Self {
            priority: SpeechPriority::from_urgency(urgency),
            direction,
            pan: spatial_pan(center_x, frame_width),
            phrase: compose_phrase(label, reason, direction, moving),
        }
    }

    /// 完整播报: 短语 + 路径状态
    pub fn narration(&self, path: PathStatus) -> String {
        format!("{}; {}", self.phrase, path_clause(path))
    }

    pub fn is_critical(&self) -> bool {
        self.priority == SpeechPriority::Critical
    }
}
