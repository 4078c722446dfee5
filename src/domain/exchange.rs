// ==========================================
// 学校监督排班系统 - 换班请求领域模型
// ==========================================
// 发起方提出用自己的排班记录与接收方的记录互换;
// 只有接收方可以接受或拒绝,且只能从 PENDING 转换一次。
// 双方教师在创建时反范式化固定,不随排班记录后续变更。
// ==========================================

use crate::domain::types::ExchangeStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// SupervisionExchange - 换班请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionExchange {
    pub exchange_id: String,           // 换班请求ID
    pub sender_teacher_id: String,     // 发起教师 (创建时的发起方记录所有者)
    pub recipient_teacher_id: String,  // 接收教师 (创建时的接收方记录所有者)
    pub sender_schedule_id: String,    // 发起方排班记录
    pub recipient_schedule_id: String, // 接收方排班记录
    pub reason: String,                // 换班事由
    pub status: ExchangeStatus,        // 状态
    pub created_at: NaiveDateTime,     // 创建时间
}

impl SupervisionExchange {
    /// 判断是否待处理
    pub fn is_pending(&self) -> bool {
        self.status == ExchangeStatus::Pending
    }

    /// 判断是否已接受
    pub fn is_accepted(&self) -> bool {
        self.status == ExchangeStatus::Accepted
    }

    /// 判断是否已拒绝
    pub fn is_rejected(&self) -> bool {
        self.status == ExchangeStatus::Rejected
    }
}
