// ==========================================
// 学校监督排班系统 - 教师领域模型
// ==========================================
// Teacher: 花名册实体 (外部协作方维护,这里只读)
// TeacherSupervisionInfo: 排班引擎的候选人值对象
// ==========================================

use crate::domain::types::DutyType;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 监督岗位角色编码 (花名册筛选条件)
pub const ROLE_SUPERVISOR: &str = "SUPERVISOR";

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: String,   // 教师ID
    pub teacher_name: String, // 姓名
    pub role: String,         // 角色 (SUPERVISOR 参与排班)
    pub active: bool,         // 在职标记
}

// ==========================================
// TeacherSupervisionInfo - 候选人监督信息
// ==========================================
// 排班引擎在日期折叠中携带并更新的工作副本。
// 不变量:
// - 计数均为非负整数
// - 无监督历史用 last_supervision_date = None 表达,不用哨兵日期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherSupervisionInfo {
    pub teacher_id: String,
    pub teacher_name: String,
    /// 禁排星期集合 (硬约束,命中即从候选集中剔除)
    pub ban_weekdays: HashSet<Weekday>,
    /// 最近一次监督日期 (跨全部职责类型取最大; 无历史为 None)
    pub last_supervision_date: Option<NaiveDate>,
    /// 累计监督次数 (按"日期×职责"计一次)
    pub total_supervision_count: u32,
    /// 按职责类型分解的监督次数
    pub duty_type_counts: HashMap<DutyType, u32>,
}

impl TeacherSupervisionInfo {
    /// 构造无历史的候选人
    pub fn new(teacher_id: impl Into<String>, teacher_name: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            teacher_name: teacher_name.into(),
            ban_weekdays: HashSet::new(),
            last_supervision_date: None,
            total_supervision_count: 0,
            duty_type_counts: HashMap::new(),
        }
    }

    /// 指定日期是否命中禁排日
    pub fn is_banned_on(&self, day: NaiveDate) -> bool {
        self.ban_weekdays.contains(&day.weekday())
    }

    /// 指定职责类型的监督次数
    pub fn duty_count(&self, duty: DutyType) -> u32 {
        self.duty_type_counts.get(&duty).copied().unwrap_or(0)
    }

    /// 记录一次当选
    ///
    /// 引擎在每个日期选中该教师后调用,下一个日期的排序
    /// 看到的就是更新后的状态。
    pub fn record_assignment(&mut self, day: NaiveDate, duty: DutyType) {
        self.last_supervision_date = Some(day);
        self.total_supervision_count += 1;
        *self.duty_type_counts.entry(duty).or_insert(0) += 1;
    }
}
