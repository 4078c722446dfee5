// ==========================================
// 学校监督排班系统 - 排班配置读取 Trait
// ==========================================
// 职责: 定义自动排班所需的配置读取接口 (不包含实现)
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::ExistingSchedulePolicy;
use crate::engine::priority::PriorityWeights;
use async_trait::async_trait;

// ==========================================
// AssignConfigReader Trait
// ==========================================
// 实现者: ConfigManager (从 config_kv 表读取)
#[async_trait]
pub trait AssignConfigReader: Send + Sync {
    /// 获取优先级评分权重
    ///
    /// # 配置键
    /// - assign/priority_weights (JSON,可部分覆盖)
    ///
    /// # 默认值
    /// - PriorityWeights::default()
    async fn get_priority_weights(&self) -> anyhow::Result<PriorityWeights>;

    /// 获取"目标日期已有排班"的处理策略
    ///
    /// # 配置键
    /// - assign/existing_schedule_policy ("SKIP" | "ABORT")
    ///
    /// # 默认值
    /// - SKIP
    async fn get_existing_schedule_policy(&self) -> anyhow::Result<ExistingSchedulePolicy>;
}
