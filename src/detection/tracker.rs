// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 多目标跟踪公共组件
//! Common components for multi-object tracking

use std::time::Instant;

use super::types::{Detection, TrackedObject};

// ========== 跟踪器统一接口 ==========

/// 多目标跟踪器 Trait
///
/// 跟踪表由实现者独占, 外部只能拿到只读引用
pub trait Tracker {
    /// 更新跟踪器 (原地修改跟踪表)
    ///
    /// # 参数
    /// - `detections`: 当前帧的检测 (按输入顺序处理)
    /// - `now`: 当前帧时间戳, 调用方保证单调不减
    fn update(&mut self, detections: &[Detection], now: Instant);

    /// 当前所有活跃的跟踪对象 (按ID升序)
    fn tracks(&self) -> Box<dyn Iterator<Item = &TrackedObject> + '_>;

    /// 按ID查找
    fn get(&self, id: u64) -> Option<&TrackedObject>;

    /// 重置跟踪器 (清除所有跟踪, ID计数不回退)
    fn reset(&mut self);

    /// 获取当前跟踪数量
    fn track_count(&self) -> usize;
}

// ========== 工具函数 ==========

/// 计算帧间隔 (秒)
///
/// 首帧使用 `default_dt`; 零或负间隔被抬到 `min_dt`
pub fn frame_dt(last: Option<Instant>, now: Instant, default_dt: f32, min_dt: f32) -> f32 {
    let dt = match last {
        Some(last) => now.saturating_duration_since(last).as_secs_f32(),
        None => default_dt,
    };
    if dt.is_finite() {
        dt.max(min_dt)
    } else {
        default_dt.max(min_dt)
    }
}
