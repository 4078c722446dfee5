// ==========================================
// 学校监督排班系统 - 优先级评分
// ==========================================
// 职责: 为候选教师计算排班优先级分数 (分数高者先选)
// 红线: 禁排日是硬约束,绝不通过分数表达 —— 命中禁排日的
//       教师必须在评分前被移出候选集
// ==========================================

use crate::domain::teacher::TeacherSupervisionInfo;
use crate::domain::types::DutyType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 无历史教师的等效"距上次监督天数"上限
///
/// last_supervision_date = None 视为最大新近度; 有历史的天数差
/// 也按此钳制,保证无历史者不会被超长历史反超。
pub const MAX_RECENCY_DAYS: i64 = 3650;

// ==========================================
// PriorityWeights - 可调权重
// ==========================================
// 分数 = recency_weight * 距上次监督天数
//      - total_count_weight * 累计监督次数
//      - duty_count_weight  * 该职责类型监督次数
//
// 三个权重都要求严格为正,才能保证:
// - 无历史 ≥ 任何有历史者 (其余相同)
// - 分数随累计次数严格递减
// - 分数随该职责次数严格递减
//
// 可通过 config_kv 键 assign/priority_weights 覆盖 (部分覆盖,
// 缺省字段取默认值)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityWeights {
    /// 新近度权重 (每天)
    pub recency_weight: f64,
    /// 累计次数权重
    pub total_count_weight: f64,
    /// 职责类型次数权重
    pub duty_count_weight: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            recency_weight: 1.0,
            total_count_weight: 2.0,
            duty_count_weight: 1.0,
        }
    }
}

/// config_kv 中的部分覆盖载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriorityWeightsOverride {
    #[serde(default)]
    pub recency_weight: Option<f64>,
    #[serde(default)]
    pub total_count_weight: Option<f64>,
    #[serde(default)]
    pub duty_count_weight: Option<f64>,
}

impl PriorityWeightsOverride {
    /// 覆盖合并到默认权重之上
    pub fn merge_over_defaults(&self) -> PriorityWeights {
        let defaults = PriorityWeights::default();
        PriorityWeights {
            recency_weight: self.recency_weight.unwrap_or(defaults.recency_weight),
            total_count_weight: self
                .total_count_weight
                .unwrap_or(defaults.total_count_weight),
            duty_count_weight: self.duty_count_weight.unwrap_or(defaults.duty_count_weight),
        }
    }
}

// ==========================================
// PriorityScorer - 评分器
// ==========================================
pub struct PriorityScorer {
    weights: PriorityWeights,
}

impl PriorityScorer {
    /// 构造评分器
    pub fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    /// 计算候选分数 (分数高者更优先)
    ///
    /// # 参数
    /// - info: 候选教师的当前工作副本
    /// - target_date: 目标日期
    /// - duty_type: 本次要分配的职责类型
    pub fn score(
        &self,
        info: &TeacherSupervisionInfo,
        target_date: NaiveDate,
        duty_type: DutyType,
    ) -> f64 {
        let recency_days = match info.last_supervision_date {
            None => MAX_RECENCY_DAYS,
            Some(last) => (target_date - last).num_days().clamp(0, MAX_RECENCY_DAYS),
        };

        self.weights.recency_weight * recency_days as f64
            - self.weights.total_count_weight * f64::from(info.total_supervision_count)
            - self.weights.duty_count_weight * f64::from(info.duty_count(duty_type))
    }

    /// 比较两个候选 (优先者排前)
    ///
    /// 分数高者优先; 同分时按 teacher_id 升序,保证结果确定。
    pub fn compare(
        &self,
        a: &TeacherSupervisionInfo,
        b: &TeacherSupervisionInfo,
        target_date: NaiveDate,
        duty_type: DutyType,
    ) -> Ordering {
        let score_a = self.score(a, target_date, duty_type);
        let score_b = self.score(b, target_date, duty_type);

        match score_b.total_cmp(&score_a) {
            Ordering::Equal => a.teacher_id.cmp(&b.teacher_id),
            other => other,
        }
    }
}
