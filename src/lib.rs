// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 导航辅助紧急度引擎
//! Real-time tracking, urgency scoring and announcement debouncing for assistive navigation

pub mod announce; // 播报闸门与语音提示
pub mod config; // 引擎配置参数
pub mod detection; // 目标追踪
pub mod pipeline; // 每帧处理入口
pub mod priority; // 紧急度评分与选择
pub mod xbus; // 广播总线

pub use crate::config::EngineConfig;
pub use crate::detection::{BBox, CentroidTracker, Detection, TrackedObject, Tracker};
pub use crate::pipeline::{FrameInput, FrameRecord, UrgencyEngine, UrgencyUpdate};
pub use crate::priority::{PathStatus, SelectedEvent, UrgencyReason};

/// 生成时间字符串 (北京时间), 用于输出文件命名
pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = match chrono::FixedOffset::east_opt(8 * 60 * 60) {
        Some(offset) => chrono::Utc::now().with_timezone(&offset).naive_local(),
        None => chrono::Utc::now().naive_utc(),
    };
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}
