// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 紧急度评估 (Urgency Scoring)
///
/// - tables:   类别风险静态表
/// - scorer:   多因子紧急度评分
/// - selector: 每帧选出最紧急的目标
pub mod scorer;
pub mod selector;
pub mod tables;

pub use scorer::{FactorScores, UrgencyReason, UrgencyScore};
pub use selector::{PathStatus, SelectedEvent, Selector};
