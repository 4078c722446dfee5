// ==========================================
// 学校监督排班系统 - 排班记录仓储
// ==========================================
// 职责: 排班记录的批量写入/查询/按教师聚合统计
// 红线: 批量写入必须在单事务内完成,任一失败整体回滚
// ==========================================

use crate::domain::schedule::SupervisionSchedule;
use crate::domain::types::{DutyType, Period};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 日期列的存储格式
const DAY_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// SupervisionStats - 按教师聚合的监督统计
// ==========================================
// 一次自动排班给同一职责写 3 条节次记录,统计口径按
// "日期×职责"去重计一次,与引擎的计数更新保持一致。
#[derive(Debug, Clone, Default)]
pub struct SupervisionStats {
    /// 最近一次监督日期 (跨全部职责类型取最大; 无记录为 None)
    pub last_supervision_date: Option<NaiveDate>,
    /// 累计监督次数
    pub total_count: u32,
    /// 按职责类型分解的监督次数
    pub duty_type_counts: HashMap<DutyType, u32>,
}

// ==========================================
// ScheduleRepository - 排班记录仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的 ScheduleRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入排班记录 (单事务)
    ///
    /// 一次自动排班的全部草稿在这里一次性落库;
    /// 任何一条失败都会回滚整批,不留部分写入。
    pub fn save_all(&self, schedules: &[SupervisionSchedule]) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO supervision_schedule
                   (schedule_id, teacher_id, day, period, duty_type)
                   VALUES (?, ?, ?, ?, ?)"#,
            )?;

            for schedule in schedules {
                stmt.execute(params![
                    &schedule.schedule_id,
                    &schedule.teacher_id,
                    schedule.day.format(DAY_FORMAT).to_string(),
                    schedule.period.as_str(),
                    schedule.duty_type.as_str(),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 按 schedule_id 查询排班记录
    pub fn find_by_id(&self, schedule_id: &str) -> RepositoryResult<Option<SupervisionSchedule>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT schedule_id, teacher_id, day, period, duty_type
               FROM supervision_schedule
               WHERE schedule_id = ?"#,
            params![schedule_id],
            |row| Self::map_row(row),
        ) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询指定日期的全部排班记录 (节次、职责有序)
    pub fn list_by_day(&self, day: NaiveDate) -> RepositoryResult<Vec<SupervisionSchedule>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT schedule_id, teacher_id, day, period, duty_type
               FROM supervision_schedule
               WHERE day = ?
               ORDER BY duty_type, period"#,
        )?;

        let schedules = stmt
            .query_map(params![day.format(DAY_FORMAT).to_string()], |row| {
                Self::map_row(row)
            })?
            .collect::<Result<Vec<SupervisionSchedule>, _>>()?;

        Ok(schedules)
    }

    /// 指定日期是否已有排班记录
    pub fn exists_by_day(&self, day: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM supervision_schedule WHERE day = ?",
            params![day.format(DAY_FORMAT).to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// 统计排班记录总数 (测试与报表用)
    pub fn count_all(&self) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;

        let count: i64 =
            conn.query_row("SELECT COUNT(1) FROM supervision_schedule", [], |row| {
                row.get(0)
            })?;

        Ok(count as u32)
    }

    /// 按教师聚合监督统计
    ///
    /// # 口径
    /// - last_supervision_date: 全部记录的最大日期
    /// - duty_type_counts: 每个职责类型 COUNT(DISTINCT day)
    /// - total_count: 各职责计数之和
    pub fn supervision_stats(&self, teacher_id: &str) -> RepositoryResult<SupervisionStats> {
        let conn = self.get_conn()?;

        let last_day: Option<String> = conn.query_row(
            "SELECT MAX(day) FROM supervision_schedule WHERE teacher_id = ?",
            params![teacher_id],
            |row| row.get(0),
        )?;

        let last_supervision_date = match last_day {
            Some(s) => Some(NaiveDate::parse_from_str(&s, DAY_FORMAT).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "supervision_schedule.day".to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let mut stmt = conn.prepare(
            r#"SELECT duty_type, COUNT(DISTINCT day)
               FROM supervision_schedule
               WHERE teacher_id = ?
               GROUP BY duty_type"#,
        )?;

        let rows = stmt
            .query_map(params![teacher_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<(String, i64)>, _>>()?;

        let mut duty_type_counts = HashMap::new();
        let mut total_count: u32 = 0;
        for (code, count) in rows {
            let duty = DutyType::parse(&code).map_err(|e| RepositoryError::FieldValueError {
                field: "supervision_schedule.duty_type".to_string(),
                message: e.to_string(),
            })?;
            duty_type_counts.insert(duty, count as u32);
            total_count += count as u32;
        }

        Ok(SupervisionStats {
            last_supervision_date,
            total_count,
            duty_type_counts,
        })
    }

    /// 映射数据库行到 SupervisionSchedule 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<SupervisionSchedule> {
        let day_text: String = row.get(2)?;
        let period_text: String = row.get(3)?;
        let duty_text: String = row.get(4)?;

        Ok(SupervisionSchedule {
            schedule_id: row.get(0)?,
            teacher_id: row.get(1)?,
            day: NaiveDate::parse_from_str(&day_text, DAY_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            period: Period::parse(&period_text).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            duty_type: DutyType::parse(&duty_text).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}
