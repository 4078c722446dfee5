// ==========================================
// 学校监督排班系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 可用教师不足
    ///
    /// - day = None: 候选池整体不足 2 人 (加载阶段)
    /// - day = Some: 某日期经禁排日过滤后不足 2 人 (分配阶段)
    #[error("可用教师不足: day={day:?}, eligible={eligible}")]
    InsufficientTeachers {
        day: Option<NaiveDate>,
        eligible: usize,
    },

    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
