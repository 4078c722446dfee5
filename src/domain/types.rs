// ==========================================
// 学校监督排班系统 - 领域类型定义
// ==========================================
// 监督职责类型 / 节次 / 换班状态 / 重复排班策略
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// 枚举编码解析错误
// ==========================================
// 用途: 数据库 TEXT 列 → 枚举的解析失败
#[derive(Debug, Error)]
#[error("无效的枚举编码: {0}")]
pub struct CodeParseError(pub String);

// ==========================================
// 监督职责类型 (Duty Type)
// ==========================================
// 自动排班只产生前两种; SEVENTH_PERIOD_SUPERVISION 由人工排班产生,
// 但换班工作流必须能够展示全部三种。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyType {
    SelfStudySupervision,     // 自习监督
    LeaveSeatSupervision,     // 离座监督
    SeventhPeriodSupervision, // 七教时监督
}

impl DutyType {
    /// 数据库/接口编码
    pub fn as_str(&self) -> &'static str {
        match self {
            DutyType::SelfStudySupervision => "SELF_STUDY_SUPERVISION",
            DutyType::LeaveSeatSupervision => "LEAVE_SEAT_SUPERVISION",
            DutyType::SeventhPeriodSupervision => "SEVENTH_PERIOD_SUPERVISION",
        }
    }

    /// 换班列表展示用的小写标签
    pub fn label(&self) -> &'static str {
        match self {
            DutyType::SelfStudySupervision => "self_study",
            DutyType::LeaveSeatSupervision => "leave_seat",
            DutyType::SeventhPeriodSupervision => "seventh_period",
        }
    }

    /// 从数据库编码解析
    pub fn parse(code: &str) -> Result<Self, CodeParseError> {
        match code {
            "SELF_STUDY_SUPERVISION" => Ok(DutyType::SelfStudySupervision),
            "LEAVE_SEAT_SUPERVISION" => Ok(DutyType::LeaveSeatSupervision),
            "SEVENTH_PERIOD_SUPERVISION" => Ok(DutyType::SeventhPeriodSupervision),
            other => Err(CodeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 节次 (Period)
// ==========================================
// 一个职责在一天内覆盖三个时段,每个时段一条排班记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Seventh,       // 第7节
    EighthNinth,   // 第8~9节
    TenthEleventh, // 第10~11节
}

impl Period {
    /// 一天内的全部时段,按时间顺序
    pub const ALL: [Period; 3] = [Period::Seventh, Period::EighthNinth, Period::TenthEleventh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Seventh => "SEVENTH",
            Period::EighthNinth => "EIGHTH_NINTH",
            Period::TenthEleventh => "TENTH_ELEVENTH",
        }
    }

    pub fn parse(code: &str) -> Result<Self, CodeParseError> {
        match code {
            "SEVENTH" => Ok(Period::Seventh),
            "EIGHTH_NINTH" => Ok(Period::EighthNinth),
            "TENTH_ELEVENTH" => Ok(Period::TenthEleventh),
            other => Err(CodeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 换班状态 (Exchange Status)
// ==========================================
// 状态机: PENDING → ACCEPTED | REJECTED (终态不再转换)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatus {
    Pending,  // 待处理
    Accepted, // 已接受
    Rejected, // 已拒绝
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "PENDING",
            ExchangeStatus::Accepted => "ACCEPTED",
            ExchangeStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(code: &str) -> Result<Self, CodeParseError> {
        match code {
            "PENDING" => Ok(ExchangeStatus::Pending),
            "ACCEPTED" => Ok(ExchangeStatus::Accepted),
            "REJECTED" => Ok(ExchangeStatus::Rejected),
            other => Err(CodeParseError(other.to_string())),
        }
    }

    /// 是否为终态 (终态不接受任何转换)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExchangeStatus::Pending)
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 重复排班策略 (Existing Schedule Policy)
// ==========================================
// 目标日期已有排班记录时的处理方式:
// - Skip: 跳过该日期,继续处理其余日期
// - Abort: 整批失败,不读不写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExistingSchedulePolicy {
    Skip,
    Abort,
}

impl ExistingSchedulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistingSchedulePolicy::Skip => "SKIP",
            ExistingSchedulePolicy::Abort => "ABORT",
        }
    }

    pub fn parse(code: &str) -> Result<Self, CodeParseError> {
        match code {
            "SKIP" => Ok(ExistingSchedulePolicy::Skip),
            "ABORT" => Ok(ExistingSchedulePolicy::Abort),
            other => Err(CodeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for ExistingSchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 星期编码 (Weekday Code)
// ==========================================
// 禁排日以 "MON".."SUN" 存储于 teacher_ban_day 表

/// chrono::Weekday → 数据库编码
pub fn weekday_to_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

/// 数据库编码 → chrono::Weekday
pub fn weekday_from_code(code: &str) -> Result<Weekday, CodeParseError> {
    match code {
        "MON" => Ok(Weekday::Mon),
        "TUE" => Ok(Weekday::Tue),
        "WED" => Ok(Weekday::Wed),
        "THU" => Ok(Weekday::Thu),
        "FRI" => Ok(Weekday::Fri),
        "SAT" => Ok(Weekday::Sat),
        "SUN" => Ok(Weekday::Sun),
        other => Err(CodeParseError(other.to_string())),
    }
}
