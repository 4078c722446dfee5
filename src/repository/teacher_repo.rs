// ==========================================
// 学校监督排班系统 - 教师仓储
// ==========================================
// 职责: 花名册查询与禁排日查询 (排班引擎的外部协作方)
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::domain::teacher::{Teacher, ROLE_SUPERVISOR};
use crate::domain::types::{weekday_from_code, weekday_to_code};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Weekday;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// TeacherRepository - 教师仓储
// ==========================================
pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// 创建新的 TeacherRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部在职监督教师 (排班候选池的来源)
    ///
    /// # 返回
    /// - `Ok(Vec<Teacher>)`: 按 teacher_id 升序
    pub fn list_active_supervisors(&self) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT teacher_id, teacher_name, role, active
               FROM teacher
               WHERE active = 1 AND role = ?
               ORDER BY teacher_id ASC"#,
        )?;

        let teachers = stmt
            .query_map(params![ROLE_SUPERVISOR], |row| Self::map_row(row))?
            .collect::<Result<Vec<Teacher>, _>>()?;

        Ok(teachers)
    }

    /// 按 teacher_id 查询教师
    pub fn find_by_id(&self, teacher_id: &str) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT teacher_id, teacher_name, role, active
               FROM teacher
               WHERE teacher_id = ?"#,
            params![teacher_id],
            |row| Self::map_row(row),
        ) {
            Ok(teacher) => Ok(Some(teacher)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询教师的禁排星期集合
    ///
    /// # 返回
    /// - `Ok(HashSet<Weekday>)`: 无禁排日时为空集合
    pub fn find_ban_weekdays(&self, teacher_id: &str) -> RepositoryResult<HashSet<Weekday>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT weekday FROM teacher_ban_day WHERE teacher_id = ?")?;

        let codes = stmt
            .query_map(params![teacher_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut weekdays = HashSet::with_capacity(codes.len());
        for code in codes {
            let wd = weekday_from_code(&code).map_err(|e| RepositoryError::FieldValueError {
                field: "teacher_ban_day.weekday".to_string(),
                message: e.to_string(),
            })?;
            weekdays.insert(wd);
        }

        Ok(weekdays)
    }

    /// 写入教师 (测试与初始化数据用)
    pub fn insert(&self, teacher: &Teacher) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO teacher (teacher_id, teacher_name, role, active)
               VALUES (?, ?, ?, ?)"#,
            params![
                &teacher.teacher_id,
                &teacher.teacher_name,
                &teacher.role,
                teacher.active as i32,
            ],
        )?;

        Ok(())
    }

    /// 写入禁排日 (测试与初始化数据用)
    pub fn add_ban_weekday(&self, teacher_id: &str, weekday: Weekday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT OR IGNORE INTO teacher_ban_day (teacher_id, weekday) VALUES (?, ?)",
            params![teacher_id, weekday_to_code(weekday)],
        )?;

        Ok(())
    }

    /// 映射数据库行到 Teacher 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Teacher> {
        Ok(Teacher {
            teacher_id: row.get(0)?,
            teacher_name: row.get(1)?,
            role: row.get(2)?,
            active: row.get::<_, i32>(3)? != 0,
        })
    }
}
