// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 播报闸门 (Announcement Gate)
//!
//! 去抖状态机: 只记录上一次播报的 (时间, 类别), 决策只依赖距上次播报经过的时间

use std::time::{Duration, Instant};

use crate::config::GateParams;

/// 播报闸门
#[derive(Debug, Clone, Default)]
pub struct AnnouncementGate {
    params: GateParams,
    last: Option<(Instant, String)>,
}

impl AnnouncementGate {
    pub fn new(params: GateParams) -> Self {
        Self { params, last: None }
    }

    /// 是否允许播报; 允许时记录 (now, label)
    pub fn should_announce(&mut self, label: &str, urgency: f32, now: Instant) -> bool {
        let urgent = urgency >= self.params.urgent_threshold;
        let urgent_gap = Duration::from_millis(self.params.urgent_gap_ms);
        let normal_gap = Duration::from_millis(self.params.normal_gap_ms);

        let allowed = match &self.last {
            None => true,
            Some((at, last_label)) => {
                let elapsed = now.saturating_duration_since(*at);
                if last_label != label {
                    let gap = if urgent { urgent_gap } else { normal_gap };
                    elapsed >= gap
                } else {
                    (urgent && elapsed >= urgent_gap) || elapsed >= normal_gap
                }
            }
        };

        if allowed {
            self.last = Some((now, label.to_string()));
        }
        allowed
    }

    /// 上一次播报
    pub fn last_announcement(&self) -> Option<(Instant, &str)> {
        self.last.as_ref().map(|(at, label)| (*at, label.as_str()))
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_first_event_announces() {
        let mut gate = AnnouncementGate::default();
        let t0 = Instant::now();
        assert!(gate.should_announce("person", 0.3, t0));
        assert_eq!(gate.last_announcement(), Some((t0, "person")));
    }

    #[test]
    fn test_same_label_urgent_gap() {
        let t0 = Instant::now();

        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("car", 0.9, t0));
        assert!(gate.should_announce("car", 0.9, after(t0, 600)));

        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("car", 0.9, t0));
        assert!(!gate.should_announce("car", 0.9, after(t0, 300)));
    }

    #[test]
    fn test_same_label_normal_gap() {
        let t0 = Instant::now();
        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("bench", 0.5, t0));
        assert!(!gate.should_announce("bench", 0.5, after(t0, 600)));
        assert!(!gate.should_announce("bench", 0.5, after(t0, 1999)));
        assert!(gate.should_announce("bench", 0.5, after(t0, 2000)));
    }

    #[test]
    fn test_different_label_respects_gap() {
        let t0 = Instant::now();
        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("person", 0.9, t0));

        // 300ms < 500ms 紧急间隔 → 抑制
        assert!(!gate.should_announce("car", 0.9, after(t0, 300)));
        assert!(gate.should_announce("car", 0.9, after(t0, 500)));

        // 普通紧急度需要2秒
        assert!(!gate.should_announce("dog", 0.4, after(t0, 1500)));
        assert!(gate.should_announce("dog", 0.4, after(t0, 2500)));
    }

    #[test]
    fn test_suppression_does_not_record() {
        let t0 = Instant::now();
        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("car", 0.9, t0));
        assert!(!gate.should_announce("car", 0.9, after(t0, 300)));
        // 距上一次 *播报* 已过 500ms, 被抑制的那次不计时
        assert!(gate.should_announce("car", 0.9, after(t0, 500)));
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut gate = AnnouncementGate::default();
        assert!(gate.should_announce("car", 0.5, t0));
        gate.reset();
        assert!(gate.last_announcement().is_none());
        assert!(gate.should_announce("car", 0.5, after(t0, 10)));
    }
}
