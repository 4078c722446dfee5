// ==========================================
// 学校监督排班系统 - API层错误类型
// ==========================================
// 职责: 定义面向调用方的错误分类,转换下层技术错误
// 全部为终态错误,不做自动重试,需调用方修正输入
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误
    // ==========================================
    /// 日期区间非法 (缺失/倒序/超 365 天),发生在任何读写之前
    #[error("无效的日期范围: {0}")]
    InvalidDateRange(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 可用教师不足 (池不足 2 人,或某日期过滤后不足 2 人)
    #[error("可用教师不足: day={day:?}, eligible={eligible}")]
    InsufficientTeachers {
        day: Option<NaiveDate>,
        eligible: usize,
    },

    /// 目标日期已有排班 (仅 ABORT 策略下出现)
    #[error("日期已存在排班: {0}")]
    ScheduleAlreadyExists(NaiveDate),

    #[error("排班记录不存在: schedule_id={0}")]
    ScheduleNotFound(String),

    #[error("换班请求不存在: exchange_id={0}")]
    ExchangeNotFound(String),

    /// 操作者不是该换班动作要求的当事教师
    #[error("无权限操作: {0}")]
    UnauthorizedAccess(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::NotFound { entity, id } => {
                // 仓储层的 NotFound 已在 API 层前置检查后基本不再出现,
                // 保留映射以免技术细节泄漏给调用方
                ApiError::DatabaseError(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InsufficientTeachers { day, eligible } => {
                ApiError::InsufficientTeachers { day, eligible }
            }
            EngineError::Internal(msg) => ApiError::InternalError(msg),
            EngineError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
