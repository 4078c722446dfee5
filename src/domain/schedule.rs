// ==========================================
// 学校监督排班系统 - 排班记录领域模型
// ==========================================
// 一条记录 = 某教师在某日某节次承担某职责。
// 自动排班每天每职责写入 3 条 (每节次一条),共 6 条。
// ==========================================

use crate::domain::types::{DutyType, Period};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SupervisionSchedule - 监督排班记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionSchedule {
    pub schedule_id: String, // 排班记录ID
    pub teacher_id: String,  // 承担教师 (换班接受时被交换的唯一字段)
    pub day: NaiveDate,      // 日期
    pub period: Period,      // 节次
    pub duty_type: DutyType, // 职责类型
}
