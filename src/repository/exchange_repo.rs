// ==========================================
// 学校监督排班系统 - 换班请求仓储
// ==========================================
// 职责: 换班请求的创建/查询/状态转换
// 红线: accept 的状态 CAS 与两条排班记录的教师互换
//       必须在同一事务内完成,绝不允许换一半
// ==========================================

use crate::domain::exchange::SupervisionExchange;
use crate::domain::types::{DutyType, ExchangeStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex};

/// 时间戳列的存储格式
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// 日期列的存储格式
const DAY_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ExchangeListRow - 换班列表行 (反范式化读取)
// ==========================================
#[derive(Debug, Clone)]
pub struct ExchangeListRow {
    pub exchange: SupervisionExchange,
    pub sender_teacher_name: String,
    pub recipient_teacher_name: String,
    pub sender_day: NaiveDate,
    pub sender_duty_type: DutyType,
    pub recipient_day: NaiveDate,
    pub recipient_duty_type: DutyType,
}

// ==========================================
// ExchangeRepository - 换班请求仓储
// ==========================================
pub struct ExchangeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ExchangeRepository {
    /// 创建新的 ExchangeRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建换班请求
    pub fn create(&self, exchange: &SupervisionExchange) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO supervision_exchange (
                exchange_id, sender_teacher_id, recipient_teacher_id,
                sender_schedule_id, recipient_schedule_id,
                reason, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &exchange.exchange_id,
                &exchange.sender_teacher_id,
                &exchange.recipient_teacher_id,
                &exchange.sender_schedule_id,
                &exchange.recipient_schedule_id,
                &exchange.reason,
                exchange.status.as_str(),
                exchange.created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Ok(exchange.exchange_id.clone())
    }

    /// 按 exchange_id 查询换班请求
    pub fn find_by_id(&self, exchange_id: &str) -> RepositoryResult<Option<SupervisionExchange>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT exchange_id, sender_teacher_id, recipient_teacher_id,
                      sender_schedule_id, recipient_schedule_id,
                      reason, status, created_at
               FROM supervision_exchange
               WHERE exchange_id = ?"#,
            params![exchange_id],
            |row| Self::map_row(row),
        ) {
            Ok(exchange) => Ok(Some(exchange)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 接受换班: 状态 CAS + 两条排班记录教师互换,单事务
    ///
    /// # 并发语义
    /// CAS 只允许 PENDING → ACCEPTED 且 UPDATE 影响行数为 0 时
    /// 视为竞争失败或状态非法,整个事务回滚。两个并发 accept
    /// 至多一个能通过 CAS,互换不可能被施加两次。
    pub fn apply_accept(&self, exchange_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        Self::transition_status(&tx, exchange_id, ExchangeStatus::Accepted)?;

        // 读取两条排班记录的当前承担教师并互换
        let (sender_schedule_id, recipient_schedule_id): (String, String) = tx.query_row(
            r#"SELECT sender_schedule_id, recipient_schedule_id
               FROM supervision_exchange
               WHERE exchange_id = ?"#,
            params![exchange_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let sender_owner: String = tx.query_row(
            "SELECT teacher_id FROM supervision_schedule WHERE schedule_id = ?",
            params![&sender_schedule_id],
            |row| row.get(0),
        )?;
        let recipient_owner: String = tx.query_row(
            "SELECT teacher_id FROM supervision_schedule WHERE schedule_id = ?",
            params![&recipient_schedule_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "UPDATE supervision_schedule SET teacher_id = ? WHERE schedule_id = ?",
            params![&recipient_owner, &sender_schedule_id],
        )?;
        tx.execute(
            "UPDATE supervision_schedule SET teacher_id = ? WHERE schedule_id = ?",
            params![&sender_owner, &recipient_schedule_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 拒绝换班: 状态 CAS,无其他数据变更
    pub fn apply_reject(&self, exchange_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        Self::transition_status(&tx, exchange_id, ExchangeStatus::Rejected)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 查询某教师可见的换班请求 (作为发起方或接收方),按创建时间降序
    pub fn list_for_actor(&self, actor_id: &str) -> RepositoryResult<Vec<ExchangeListRow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT e.exchange_id, e.sender_teacher_id, e.recipient_teacher_id,
                      e.sender_schedule_id, e.recipient_schedule_id,
                      e.reason, e.status, e.created_at,
                      ts.teacher_name, tr.teacher_name,
                      ss.day, ss.duty_type,
                      rs.day, rs.duty_type
               FROM supervision_exchange e
               JOIN teacher ts ON ts.teacher_id = e.sender_teacher_id
               JOIN teacher tr ON tr.teacher_id = e.recipient_teacher_id
               JOIN supervision_schedule ss ON ss.schedule_id = e.sender_schedule_id
               JOIN supervision_schedule rs ON rs.schedule_id = e.recipient_schedule_id
               WHERE e.sender_teacher_id = ?1 OR e.recipient_teacher_id = ?1
               ORDER BY e.created_at DESC, e.exchange_id DESC"#,
        )?;

        let rows = stmt
            .query_map(params![actor_id], |row| {
                let exchange = Self::map_row(row)?;
                Ok(ExchangeListRow {
                    exchange,
                    sender_teacher_name: row.get(8)?,
                    recipient_teacher_name: row.get(9)?,
                    sender_day: parse_day(row, 10)?,
                    sender_duty_type: parse_duty(row, 11)?,
                    recipient_day: parse_day(row, 12)?,
                    recipient_duty_type: parse_duty(row, 13)?,
                })
            })?
            .collect::<Result<Vec<ExchangeListRow>, _>>()?;

        Ok(rows)
    }

    /// 状态 CAS: 仅允许从 PENDING 转出
    ///
    /// UPDATE 影响 0 行时查询当前状态以给出可解释的错误:
    /// 记录不存在 → NotFound,已是终态 → InvalidStateTransition。
    fn transition_status(
        tx: &Transaction,
        exchange_id: &str,
        to: ExchangeStatus,
    ) -> RepositoryResult<()> {
        let changed = tx.execute(
            r#"UPDATE supervision_exchange
               SET status = ?
               WHERE exchange_id = ? AND status = ?"#,
            params![
                to.as_str(),
                exchange_id,
                ExchangeStatus::Pending.as_str()
            ],
        )?;

        if changed == 0 {
            let current: Option<String> = tx
                .query_row(
                    "SELECT status FROM supervision_exchange WHERE exchange_id = ?",
                    params![exchange_id],
                    |row| row.get(0),
                )
                .optional()?;

            return Err(match current {
                None => RepositoryError::NotFound {
                    entity: "SupervisionExchange".to_string(),
                    id: exchange_id.to_string(),
                },
                Some(from) => RepositoryError::InvalidStateTransition {
                    from,
                    to: to.as_str().to_string(),
                },
            });
        }

        Ok(())
    }

    /// 映射数据库行到 SupervisionExchange 对象 (前 8 列)
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<SupervisionExchange> {
        let status_text: String = row.get(6)?;
        let created_text: String = row.get(7)?;

        Ok(SupervisionExchange {
            exchange_id: row.get(0)?,
            sender_teacher_id: row.get(1)?,
            recipient_teacher_id: row.get(2)?,
            sender_schedule_id: row.get(3)?,
            recipient_schedule_id: row.get(4)?,
            reason: row.get(5)?,
            status: ExchangeStatus::parse(&status_text).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            created_at: NaiveDateTime::parse_from_str(&created_text, DATETIME_FORMAT).map_err(
                |e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                },
            )?,
        })
    }
}

/// 读取日期列
fn parse_day(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DAY_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 读取职责类型列
fn parse_duty(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DutyType> {
    let text: String = row.get(idx)?;
    DutyType::parse(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
