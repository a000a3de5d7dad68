// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 类别风险表 (编译期静态表)
//!
//! 表是封闭的: 未知类别统一走每张表自带的兜底值, 不在评分逻辑里散落字符串判断

use phf::phf_map;

/// 按类别查值的静态表, 带显式兜底值
pub struct RiskTable {
    entries: phf::Map<&'static str, f32>,
    fallback: f32,
}

impl RiskTable {
    /// 查表; 先精确匹配, 再按小写匹配, 都失败返回兜底值
    pub fn lookup(&self, label: &str) -> f32 {
        if let Some(value) = self.entries.get(label) {
            return *value;
        }
        self.entries
            .get(label.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> f32 {
        self.fallback
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }
}

/// 类别优先级 (COCO类别名), 未知 → 0.3
pub static CLASS_PRIORITY: RiskTable = RiskTable {
    entries: phf_map! {
        "car" => 1.0,
        "truck" => 1.0,
        "bus" => 1.0,
        "train" => 1.0,
        "motorcycle" => 0.85,
        "person" => 0.85,
        "bicycle" => 0.7,
        "stop sign" => 0.7,
        "dog" => 0.7,
        "traffic light" => 0.5,
        "cat" => 0.5,
        "horse" => 0.6,
        "fire hydrant" => 0.4,
        "bench" => 0.35,
        "chair" => 0.35,
        "potted plant" => 0.3,
        "suitcase" => 0.35,
    },
    fallback: 0.3,
};

/// 运动权重 (该类别的运动有多危险), 未知 → 0.5
pub static MOTION_WEIGHT: RiskTable = RiskTable {
    entries: phf_map! {
        "car" => 1.0,
        "truck" => 1.0,
        "bus" => 1.0,
        "train" => 1.0,
        "motorcycle" => 1.0,
        "bicycle" => 0.9,
        "horse" => 0.8,
        "dog" => 0.8,
        "person" => 0.7,
        "cat" => 0.6,
        "suitcase" => 0.3,
        "chair" => 0.1,
        "bench" => 0.1,
        "potted plant" => 0.1,
        "fire hydrant" => 0.0,
        "traffic light" => 0.0,
        "stop sign" => 0.0,
    },
    fallback: 0.5,
};

/// 碰撞风险 (撞上后果多严重), 未知 → 0.5
pub static COLLISION_RISK: RiskTable = RiskTable {
    entries: phf_map! {
        "car" => 1.0,
        "truck" => 1.0,
        "bus" => 1.0,
        "train" => 1.0,
        "motorcycle" => 0.9,
        "bicycle" => 0.8,
        "fire hydrant" => 0.8,
        "horse" => 0.8,
        "bench" => 0.7,
        "chair" => 0.6,
        "person" => 0.6,
        "suitcase" => 0.6,
        "dog" => 0.5,
        "potted plant" => 0.5,
        "stop sign" => 0.4,
        "cat" => 0.3,
        "traffic light" => 0.2,
    },
    fallback: 0.5,
};

/// 单个类别的三项风险值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    pub priority: f32,
    pub motion_weight: f32,
    pub collision: f32,
}

impl RiskProfile {
    pub fn for_label(label: &str) -> Self {
        Self {
            priority: CLASS_PRIORITY.lookup(label),
            motion_weight: MOTION_WEIGHT.lookup(label),
            collision: COLLISION_RISK.lookup(label),
        }
    }
}
