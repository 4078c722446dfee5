// ==========================================
// 学校监督排班系统 - API 层
// ==========================================
// 职责: 面向调用方的业务接口与错误分类
// ==========================================

pub mod assign_api;
pub mod error;
pub mod exchange_api;

// 重导出核心接口
pub use assign_api::{AutoAssignRequest, SupervisionAssignApi, MAX_RANGE_SPAN_DAYS};
pub use error::{ApiError, ApiResult};
pub use exchange_api::{
    CreateExchangeRequest, ExchangeApi, ExchangeListEntry, ExchangeParty, ExchangeScheduleView,
};
