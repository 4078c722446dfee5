// ==========================================
// 学校监督排班系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含持久化与业务流程
// ==========================================

pub mod exchange;
pub mod schedule;
pub mod teacher;
pub mod types;

// 重导出核心领域对象
pub use exchange::SupervisionExchange;
pub use schedule::SupervisionSchedule;
pub use teacher::{Teacher, TeacherSupervisionInfo, ROLE_SUPERVISOR};
pub use types::{
    CodeParseError, DutyType, ExchangeStatus, ExistingSchedulePolicy, Period,
};
