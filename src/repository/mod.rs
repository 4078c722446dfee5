// ==========================================
// 学校监督排班系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod exchange_repo;
pub mod schedule_repo;
pub mod teacher_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use exchange_repo::{ExchangeListRow, ExchangeRepository};
pub use schedule_repo::{ScheduleRepository, SupervisionStats};
pub use teacher_repo::TeacherRepository;
