// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 目标追踪系统 (Tracking System)
///
/// - types:    检测框, 检测结果, 跟踪对象
/// - tracker:  跟踪器统一接口
/// - centroid: 同类别中心点贪心跟踪器
pub mod centroid;
pub mod tracker;
pub mod types;

pub use centroid::CentroidTracker;
pub use tracker::Tracker;
pub use types::{BBox, Detection, Point2, TrackedObject, TrackingInfo, Velocity};
