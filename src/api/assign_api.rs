// ==========================================
// 学校监督排班系统 - 自动排班接口
// ==========================================
// 流程: 区间校验 → 提取监督日 → 重复排班策略 → 加载候选池
//       → 贪心分配 → 单事务落库 → 按日报告
// 红线: 区间校验失败时不读不写; 任一日期失败整批回滚
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::assign_config_trait::AssignConfigReader;
use crate::domain::types::ExistingSchedulePolicy;
use crate::engine::assignment::AssignmentProcessor;
use crate::engine::date_range::DateRangeExtractor;
use crate::engine::persister::{DailyAssignmentReport, SchedulePersister};
use crate::engine::pool_loader::TeacherPoolLoader;
use crate::engine::priority::PriorityScorer;
use crate::repository::schedule_repo::ScheduleRepository;
use crate::repository::teacher_repo::TeacherRepository;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// 调用方允许的最大区间跨度 (天)
pub const MAX_RANGE_SPAN_DAYS: i64 = 365;

// ==========================================
// AutoAssignRequest - 自动排班入参
// ==========================================
// 两端日期都可缺失,缺失视为非法输入 (在校验阶段拒绝)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignRequest {
    pub start_day: Option<NaiveDate>,
    pub end_day: Option<NaiveDate>,
}

// ==========================================
// SupervisionAssignApi - 自动排班接口
// ==========================================
pub struct SupervisionAssignApi<C>
where
    C: AssignConfigReader,
{
    teacher_repo: Arc<TeacherRepository>,
    schedule_repo: Arc<ScheduleRepository>,
    config: Arc<C>,
}

impl<C> SupervisionAssignApi<C>
where
    C: AssignConfigReader,
{
    /// 构造自动排班接口
    pub fn new(
        teacher_repo: Arc<TeacherRepository>,
        schedule_repo: Arc<ScheduleRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            teacher_repo,
            schedule_repo,
            config,
        }
    }

    /// 对 [startDay, endDay] 执行一次自动排班
    ///
    /// # 返回
    /// 按日升序的分配报告; 区间内无可排日期时返回空列表。
    pub async fn auto_assign(
        &self,
        request: &AutoAssignRequest,
    ) -> ApiResult<Vec<DailyAssignmentReport>> {
        // 1. 区间校验 (失败时不读不写)
        let (start, end) = Self::validate_range(request)?;

        info!(start = %start, end = %end, "开始执行自动排班");

        // 2. 提取监督日 (周一~周四)
        let all_dates = DateRangeExtractor::extract_weekdays(start, end);

        // 3. 重复排班策略
        let policy = self.config.get_existing_schedule_policy().await?;
        let dates = self.apply_existing_policy(all_dates, policy)?;

        if dates.is_empty() {
            info!("区间内无待排日期");
            return Ok(Vec::new());
        }

        // 4. 加载候选池 + 读取权重
        let pool =
            TeacherPoolLoader::new(self.teacher_repo.clone(), self.schedule_repo.clone()).load()?;
        let weights = self.config.get_priority_weights().await?;

        // 5. 贪心分配
        let processor = AssignmentProcessor::new(PriorityScorer::new(weights));
        let outcome = processor.process(&pool, &dates)?;

        // 6. 单事务落库 + 按日报告
        let reports = SchedulePersister::new(self.schedule_repo.clone()).persist(&outcome.drafts)?;

        info!(
            days = reports.len(),
            rows = outcome.drafts.len(),
            "自动排班完成"
        );

        Ok(reports)
    }

    /// 区间校验: 缺失 / 倒序 / 超跨度
    fn validate_range(request: &AutoAssignRequest) -> ApiResult<(NaiveDate, NaiveDate)> {
        let start = request
            .start_day
            .ok_or_else(|| ApiError::InvalidDateRange("startDay 不能为空".to_string()))?;
        let end = request
            .end_day
            .ok_or_else(|| ApiError::InvalidDateRange("endDay 不能为空".to_string()))?;

        if start > end {
            return Err(ApiError::InvalidDateRange(format!(
                "startDay({}) 不能晚于 endDay({})",
                start, end
            )));
        }

        let span = (end - start).num_days();
        if span > MAX_RANGE_SPAN_DAYS {
            return Err(ApiError::InvalidDateRange(format!(
                "区间跨度 {} 天超过上限 {} 天",
                span, MAX_RANGE_SPAN_DAYS
            )));
        }

        Ok((start, end))
    }

    /// 应用重复排班策略
    ///
    /// - Skip: 剔除已有排班的日期并记日志,其余继续
    /// - Abort: 任一日期已有排班即整批失败
    fn apply_existing_policy(
        &self,
        dates: Vec<NaiveDate>,
        policy: ExistingSchedulePolicy,
    ) -> ApiResult<Vec<NaiveDate>> {
        let mut remaining = Vec::with_capacity(dates.len());

        for day in dates {
            if self.schedule_repo.exists_by_day(day)? {
                match policy {
                    ExistingSchedulePolicy::Skip => {
                        debug!(day = %day, "日期已有排班,按 SKIP 策略跳过");
                        continue;
                    }
                    ExistingSchedulePolicy::Abort => {
                        return Err(ApiError::ScheduleAlreadyExists(day));
                    }
                }
            }
            remaining.push(day);
        }

        Ok(remaining)
    }
}
