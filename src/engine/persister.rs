// ==========================================
// 学校监督排班系统 - 排班结果落库与报告
// ==========================================
// 职责: 整批草稿单事务落库,并按日聚合为报告
// 红线: 只在全区间处理完成后写库,不做逐日提交
// ==========================================

use crate::domain::schedule::SupervisionSchedule;
use crate::domain::types::{DutyType, Period};
use crate::engine::assignment::DraftSchedule;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

// ==========================================
// 报告 DTO (对外 JSON 为 camelCase)
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct AssignedTeacher {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSlot {
    /// 该职责第7节记录的ID (三条节次记录的代表)
    pub schedule_id: String,
    pub teacher: AssignedTeacher,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAssignmentReport {
    pub day: NaiveDate,
    pub self_study_supervision: AssignedSlot,
    pub leave_seat_supervision: AssignedSlot,
}

// ==========================================
// SchedulePersister - 落库器
// ==========================================
pub struct SchedulePersister {
    schedule_repo: Arc<ScheduleRepository>,
}

impl SchedulePersister {
    /// 构造落库器
    pub fn new(schedule_repo: Arc<ScheduleRepository>) -> Self {
        Self { schedule_repo }
    }

    /// 整批落库并生成按日报告
    ///
    /// 全部草稿在单事务中写入 (见 ScheduleRepository::save_all),
    /// 任一行失败即整批回滚。报告按日期升序。
    pub fn persist(&self, drafts: &[DraftSchedule]) -> EngineResult<Vec<DailyAssignmentReport>> {
        let rows: Vec<SupervisionSchedule> = drafts
            .iter()
            .map(|d| SupervisionSchedule {
                schedule_id: d.schedule_id.clone(),
                teacher_id: d.teacher_id.clone(),
                day: d.day,
                period: d.period,
                duty_type: d.duty_type,
            })
            .collect();

        self.schedule_repo.save_all(&rows)?;

        info!(rows = rows.len(), "排班结果已落库");

        Self::group_by_day(drafts)
    }

    /// 按日聚合草稿为报告
    ///
    /// 报告中每个职责取其第7节记录的 schedule_id。
    fn group_by_day(drafts: &[DraftSchedule]) -> EngineResult<Vec<DailyAssignmentReport>> {
        #[derive(Default)]
        struct DaySlots {
            self_study: Option<AssignedSlot>,
            leave_seat: Option<AssignedSlot>,
        }

        let mut by_day: BTreeMap<NaiveDate, DaySlots> = BTreeMap::new();

        for draft in drafts {
            if draft.period != Period::Seventh {
                continue;
            }

            let slot = AssignedSlot {
                schedule_id: draft.schedule_id.clone(),
                teacher: AssignedTeacher {
                    id: draft.teacher_id.clone(),
                    name: draft.teacher_name.clone(),
                },
            };

            let entry = by_day.entry(draft.day).or_default();
            match draft.duty_type {
                DutyType::SelfStudySupervision => entry.self_study = Some(slot),
                DutyType::LeaveSeatSupervision => entry.leave_seat = Some(slot),
                DutyType::SeventhPeriodSupervision => {}
            }
        }

        by_day
            .into_iter()
            .map(|(day, slots)| {
                let self_study = slots.self_study.ok_or_else(|| {
                    EngineError::Internal(format!("日期 {} 缺少自习监督草稿", day))
                })?;
                let leave_seat = slots.leave_seat.ok_or_else(|| {
                    EngineError::Internal(format!("日期 {} 缺少离座监督草稿", day))
                })?;
                Ok(DailyAssignmentReport {
                    day,
                    self_study_supervision: self_study,
                    leave_seat_supervision: leave_seat,
                })
            })
            .collect()
    }
}
