// ==========================================
// 学校监督排班系统 - 换班工作流接口
// ==========================================
// 状态机: PENDING → ACCEPTED | REJECTED (终态吸收)
// 权限: create 要求发起方拥有 sender 记录;
//       accept/reject 要求操作者为 recipient
// 红线: accept 的互换与状态转换由仓储在单事务内完成
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::exchange::SupervisionExchange;
use crate::domain::types::ExchangeStatus;
use crate::repository::exchange_repo::ExchangeRepository;
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// 请求/响应 DTO (对外 JSON 为 camelCase)
// ==========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExchangeRequest {
    pub sender_schedule_id: String,
    pub recipient_schedule_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeParty {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeScheduleView {
    pub schedule_id: String,
    pub day: NaiveDate,
    /// 职责类型标签: "self_study" | "leave_seat" | "seventh_period"
    pub r#type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeListEntry {
    pub exchange_id: String,
    pub status: ExchangeStatus,
    pub reason: String,
    pub created_at: NaiveDateTime,
    pub sender: ExchangeParty,
    pub recipient: ExchangeParty,
    pub sender_schedule: ExchangeScheduleView,
    pub recipient_schedule: ExchangeScheduleView,
}

// ==========================================
// ExchangeApi - 换班工作流接口
// ==========================================
pub struct ExchangeApi {
    schedule_repo: Arc<ScheduleRepository>,
    exchange_repo: Arc<ExchangeRepository>,
}

impl ExchangeApi {
    /// 构造换班工作流接口
    pub fn new(
        schedule_repo: Arc<ScheduleRepository>,
        exchange_repo: Arc<ExchangeRepository>,
    ) -> Self {
        Self {
            schedule_repo,
            exchange_repo,
        }
    }

    /// 创建换班请求 (无响应体,失败以命名错误表达)
    ///
    /// # 校验
    /// - 两条排班记录必须存在 → ScheduleNotFound
    /// - 发起者必须是 sender 记录的承担教师 → UnauthorizedAccess
    ///
    /// 双方教师在此刻反范式化写入请求。
    pub fn create(&self, request: &CreateExchangeRequest, requester_id: &str) -> ApiResult<()> {
        let sender_schedule = self
            .schedule_repo
            .find_by_id(&request.sender_schedule_id)?
            .ok_or_else(|| ApiError::ScheduleNotFound(request.sender_schedule_id.clone()))?;
        let recipient_schedule = self
            .schedule_repo
            .find_by_id(&request.recipient_schedule_id)?
            .ok_or_else(|| ApiError::ScheduleNotFound(request.recipient_schedule_id.clone()))?;

        if sender_schedule.teacher_id != requester_id {
            return Err(ApiError::UnauthorizedAccess(format!(
                "教师 {} 不是排班记录 {} 的承担者",
                requester_id, request.sender_schedule_id
            )));
        }

        let exchange = SupervisionExchange {
            exchange_id: Uuid::new_v4().to_string(),
            sender_teacher_id: sender_schedule.teacher_id,
            recipient_teacher_id: recipient_schedule.teacher_id,
            sender_schedule_id: request.sender_schedule_id.clone(),
            recipient_schedule_id: request.recipient_schedule_id.clone(),
            reason: request.reason.clone(),
            status: ExchangeStatus::Pending,
            created_at: Utc::now().naive_utc(),
        };

        let exchange_id = self.exchange_repo.create(&exchange)?;

        info!(exchange_id = %exchange_id, "换班请求已创建");

        Ok(())
    }

    /// 接受换班: 互换两条排班记录的承担教师并转入 ACCEPTED
    ///
    /// # 校验
    /// - 请求必须存在 → ExchangeNotFound
    /// - 操作者必须是 recipient → UnauthorizedAccess
    /// - 状态必须是 PENDING (仓储层 CAS) → InvalidStateTransition
    pub fn accept(&self, exchange_id: &str, actor_id: &str) -> ApiResult<()> {
        let exchange = self.load_for_decision(exchange_id, actor_id)?;

        self.exchange_repo.apply_accept(&exchange.exchange_id)?;

        info!(exchange_id = %exchange_id, "换班请求已接受,排班已互换");

        Ok(())
    }

    /// 拒绝换班: 仅状态转入 REJECTED,无其他数据变更
    pub fn reject(&self, exchange_id: &str, actor_id: &str) -> ApiResult<()> {
        let exchange = self.load_for_decision(exchange_id, actor_id)?;

        self.exchange_repo.apply_reject(&exchange.exchange_id)?;

        info!(exchange_id = %exchange_id, "换班请求已拒绝");

        Ok(())
    }

    /// 查询操作者可见的换班请求 (作为发起方或接收方),按创建时间降序
    pub fn list(&self, actor_id: &str) -> ApiResult<Vec<ExchangeListEntry>> {
        let rows = self.exchange_repo.list_for_actor(actor_id)?;

        Ok(rows
            .into_iter()
            .map(|row| ExchangeListEntry {
                exchange_id: row.exchange.exchange_id,
                status: row.exchange.status,
                reason: row.exchange.reason,
                created_at: row.exchange.created_at,
                sender: ExchangeParty {
                    id: row.exchange.sender_teacher_id,
                    name: row.sender_teacher_name,
                },
                recipient: ExchangeParty {
                    id: row.exchange.recipient_teacher_id,
                    name: row.recipient_teacher_name,
                },
                sender_schedule: ExchangeScheduleView {
                    schedule_id: row.exchange.sender_schedule_id,
                    day: row.sender_day,
                    r#type: row.sender_duty_type.label(),
                },
                recipient_schedule: ExchangeScheduleView {
                    schedule_id: row.exchange.recipient_schedule_id,
                    day: row.recipient_day,
                    r#type: row.recipient_duty_type.label(),
                },
            })
            .collect())
    }

    /// accept/reject 共用的存在性与接收方权限检查
    ///
    /// 状态本身不在这里判定 —— 并发安全由仓储层的 CAS 兜底。
    fn load_for_decision(
        &self,
        exchange_id: &str,
        actor_id: &str,
    ) -> ApiResult<SupervisionExchange> {
        let exchange = self
            .exchange_repo
            .find_by_id(exchange_id)?
            .ok_or_else(|| ApiError::ExchangeNotFound(exchange_id.to_string()))?;

        if exchange.recipient_teacher_id != actor_id {
            return Err(ApiError::UnauthorizedAccess(format!(
                "教师 {} 不是换班请求 {} 的接收方",
                actor_id, exchange_id
            )));
        }

        Ok(exchange)
    }
}
