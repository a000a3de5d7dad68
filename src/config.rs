// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 引擎配置 - 通过JSON文件调整参数
//!
//! 评分权重与类别风险表是静态的 (见 `priority::tables`), 不在此配置

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 追踪器参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    pub match_distance_px: f32, // 中心点匹配距离阈值
    pub velocity_alpha: f32,    // 速度EMA系数
    pub max_missed_frames: u32, // 最大丢失帧数 (按当前帧间隔换算成时间)
    pub default_dt_secs: f32,   // 首帧或时间戳缺失时的帧间隔
    pub min_dt_secs: f32,       // 帧间隔下限 (防止速度无穷大)
    pub trajectory_len: usize,  // 轨迹保留点数
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            match_distance_px: 100.0,
            velocity_alpha: 0.3,
            max_missed_frames: 5,
            default_dt_secs: 0.1,
            min_dt_secs: 0.001,
            trajectory_len: 30,
        }
    }
}

/// 选择器参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorParams {
    pub far_distance_m: f32,  // 远距离阈值
    pub far_min_urgency: f32, // 远距离目标的最低紧急度
    pub urgency_floor: f32,   // 全局紧急度下限
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            far_distance_m: 4.0,
            far_min_urgency: 0.5,
            urgency_floor: 0.25,
        }
    }
}

/// 播报闸门参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateParams {
    pub urgent_threshold: f32, // 紧急播报阈值 (同时也是语音打断阈值)
    pub urgent_gap_ms: u64,    // 紧急事件最小播报间隔
    pub normal_gap_ms: u64,    // 普通事件最小播报间隔
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            urgent_threshold: 0.85,
            urgent_gap_ms: 500,
            normal_gap_ms: 2000,
        }
    }
}

/// 引擎配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tracker: TrackerParams,
    pub selector: SelectorParams,
    pub gate: GateParams,
    /// 每个订阅者的队列深度
    pub bus_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerParams::default(),
            selector: SelectorParams::default(),
            gate: GateParams::default(),
            bus_capacity: Self::DEFAULT_BUS_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_BUS_CAPACITY: usize = 64;

    /// 从JSON文件加载配置
    ///
    /// 文件不存在时写入默认配置; 解析或校验失败时使用默认值
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match Self::from_json_str(&json) {
                Ok(config) => {
                    info!("✅ 配置已从 {} 加载", path.display());
                    config
                }
                Err(e) => {
                    warn!("⚠️  配置文件无效: {:#}, 使用默认值", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("📝 配置文件不存在,创建默认配置...");
                let config = Self::default();
                if let Err(e) = config.save(path) {
                    warn!("❌ 保存配置失败: {:#}", e);
                }
                config
            }
        }
    }

    /// 从JSON字符串解析并校验
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("解析配置JSON失败")?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, json).with_context(|| format!("写入 {} 失败", path.display()))?;
        info!("💾 配置已保存到 {}", path.display());
        Ok(())
    }

    /// 校验参数: 非有限值或非正值一律拒绝
    pub fn validate(&self) -> Result<()> {
        let t = &self.tracker;
        if !(t.match_distance_px.is_finite() && t.match_distance_px > 0.0) {
            bail!("tracker.match_distance_px 必须为正数: {}", t.match_distance_px);
        }
        if !(t.velocity_alpha > 0.0 && t.velocity_alpha <= 1.0) {
            bail!("tracker.velocity_alpha 必须在 (0, 1] 内: {}", t.velocity_alpha);
        }
        if !(t.min_dt_secs.is_finite() && t.min_dt_secs > 0.0) {
            bail!("tracker.min_dt_secs 必须为正数: {}", t.min_dt_secs);
        }
        if !(t.default_dt_secs.is_finite() && t.default_dt_secs >= t.min_dt_secs) {
            bail!(
                "tracker.default_dt_secs 必须不小于 min_dt_secs: {}",
                t.default_dt_secs
            );
        }

        let s = &self.selector;
        for (name, value) in [
            ("selector.far_distance_m", s.far_distance_m),
            ("selector.far_min_urgency", s.far_min_urgency),
            ("selector.urgency_floor", s.urgency_floor),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} 必须为非负有限值: {}", name, value);
            }
        }

        let g = &self.gate;
        if !(0.0..=1.0).contains(&g.urgent_threshold) {
            bail!("gate.urgent_threshold 必须在 [0, 1] 内: {}", g.urgent_threshold);
        }
        if g.urgent_gap_ms > g.normal_gap_ms {
            bail!(
                "gate.urgent_gap_ms ({}) 不能大于 normal_gap_ms ({})",
                g.urgent_gap_ms,
                g.normal_gap_ms
            );
        }
        if self.bus_capacity == 0 {
            bail!("bus_capacity 必须大于0");
        }
        Ok(())
    }

    /// 打印当前配置
    pub fn log_summary(&self) {
        info!("🎛️  当前引擎配置:");
        info!(
            "  追踪: 匹配距离 {:.0}px | α={:.2} | 最大丢失 {} 帧",
            self.tracker.match_distance_px,
            self.tracker.velocity_alpha,
            self.tracker.max_missed_frames
        );
        info!(
            "  选择: 远距 {:.1}m 需 ≥{:.2} | 下限 {:.2}",
            self.selector.far_distance_m, self.selector.far_min_urgency, self.selector.urgency_floor
        );
        info!(
            "  播报: 紧急 ≥{:.2} 间隔 {}ms | 普通间隔 {}ms",
            self.gate.urgent_threshold, self.gate.urgent_gap_ms, self.gate.normal_gap_ms
        );
    }
}
