// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 播报 (Announcement)
///
/// - gate:      播报去抖闸门
/// - narration: 语音提示 (优先级, 方位, 短语)
pub mod gate;
pub mod narration;

pub use gate::AnnouncementGate;
pub use narration::{Direction, SpeechCue, SpeechPriority};
