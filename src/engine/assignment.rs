// ==========================================
// 学校监督排班系统 - 分配处理器
// ==========================================
// 贪心单遍算法: 按日期升序折叠,每个日期依据"当前"候选状态
// 选出自习/离座两名教师,选中即更新工作副本,下一个日期看到
// 的就是更新后的状态。不回溯,不保证全局最优。
// ==========================================

use crate::domain::teacher::TeacherSupervisionInfo;
use crate::domain::types::{DutyType, Period};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::priority::PriorityScorer;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// 每个日期要求的最少可用教师数 (自习/离座各一名,必须不同人)
pub const MIN_TEACHERS_PER_DAY: usize = 2;

// ==========================================
// DraftSchedule - 排班草稿行
// ==========================================
// 落库前的内存草稿; teacher_name 冗余携带,供报告使用。
#[derive(Debug, Clone)]
pub struct DraftSchedule {
    pub schedule_id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub day: NaiveDate,
    pub period: Period,
    pub duty_type: DutyType,
}

// ==========================================
// AssignmentOutcome - 分配结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// 全区间的草稿行,按日期升序 (每天 6 行)
    pub drafts: Vec<DraftSchedule>,
    /// 折叠结束后的候选池工作副本 (计数已累加)
    pub final_pool: HashMap<String, TeacherSupervisionInfo>,
}

// ==========================================
// AssignmentProcessor - 分配处理器
// ==========================================
pub struct AssignmentProcessor {
    scorer: PriorityScorer,
}

impl AssignmentProcessor {
    /// 构造分配处理器
    pub fn new(scorer: PriorityScorer) -> Self {
        Self { scorer }
    }

    /// 对目标日期列表执行贪心分配
    ///
    /// 入参候选池不被修改,折叠携带其克隆副本;
    /// 任一日期可用教师不足时整批失败,不产出部分结果。
    ///
    /// # 每个日期的步骤
    /// 1. 过滤掉禁排日命中者 (硬约束)
    /// 2. 不足 2 人 → InsufficientTeachers,整批中止
    /// 3. 按自习监督评分取最高者
    /// 4. 其余候选按离座监督重新评分取最高者
    /// 5. 每人每职责产出 3 条草稿 (每节次一条)
    /// 6. 更新两人的工作副本
    pub fn process(
        &self,
        initial_pool: &HashMap<String, TeacherSupervisionInfo>,
        dates: &[NaiveDate],
    ) -> EngineResult<AssignmentOutcome> {
        let mut pool = initial_pool.clone();
        let mut drafts = Vec::with_capacity(dates.len() * 6);

        for &day in dates {
            // 步骤1: 禁排日硬过滤
            let mut eligible: Vec<String> = pool
                .values()
                .filter(|info| !info.is_banned_on(day))
                .map(|info| info.teacher_id.clone())
                .collect();

            // 步骤2: 人数下限
            if eligible.len() < MIN_TEACHERS_PER_DAY {
                return Err(EngineError::InsufficientTeachers {
                    day: Some(day),
                    eligible: eligible.len(),
                });
            }

            // 步骤3: 自习监督取最高分
            let self_study_id =
                self.pick_top(&pool, &eligible, day, DutyType::SelfStudySupervision)?;
            eligible.retain(|id| *id != self_study_id);

            // 步骤4: 离座监督在余下候选中取最高分
            let leave_seat_id =
                self.pick_top(&pool, &eligible, day, DutyType::LeaveSeatSupervision)?;

            debug!(
                day = %day,
                self_study = %self_study_id,
                leave_seat = %leave_seat_id,
                "完成单日分配"
            );

            // 步骤5: 产出草稿行
            Self::push_duty_drafts(&mut drafts, &pool, &self_study_id, day, DutyType::SelfStudySupervision)?;
            Self::push_duty_drafts(&mut drafts, &pool, &leave_seat_id, day, DutyType::LeaveSeatSupervision)?;

            // 步骤6: 更新工作副本,下一日期按新状态排序
            Self::record(&mut pool, &self_study_id, day, DutyType::SelfStudySupervision)?;
            Self::record(&mut pool, &leave_seat_id, day, DutyType::LeaveSeatSupervision)?;
        }

        Ok(AssignmentOutcome {
            drafts,
            final_pool: pool,
        })
    }

    /// 在候选集合中取分数最高者 (同分按 teacher_id 升序)
    fn pick_top(
        &self,
        pool: &HashMap<String, TeacherSupervisionInfo>,
        candidate_ids: &[String],
        day: NaiveDate,
        duty: DutyType,
    ) -> EngineResult<String> {
        let mut best: Option<&TeacherSupervisionInfo> = None;

        for id in candidate_ids {
            let info = pool
                .get(id)
                .ok_or_else(|| EngineError::Internal(format!("候选不在池中: {}", id)))?;

            best = match best {
                None => Some(info),
                Some(current) => {
                    if self.scorer.compare(info, current, day, duty).is_lt() {
                        Some(info)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        best.map(|info| info.teacher_id.clone())
            .ok_or_else(|| EngineError::Internal("候选集合为空".to_string()))
    }

    /// 为选中教师产出一个职责的 3 条节次草稿
    fn push_duty_drafts(
        drafts: &mut Vec<DraftSchedule>,
        pool: &HashMap<String, TeacherSupervisionInfo>,
        teacher_id: &str,
        day: NaiveDate,
        duty: DutyType,
    ) -> EngineResult<()> {
        let info = pool
            .get(teacher_id)
            .ok_or_else(|| EngineError::Internal(format!("选中教师不在池中: {}", teacher_id)))?;

        for period in Period::ALL {
            drafts.push(DraftSchedule {
                schedule_id: Uuid::new_v4().to_string(),
                teacher_id: info.teacher_id.clone(),
                teacher_name: info.teacher_name.clone(),
                day,
                period,
                duty_type: duty,
            });
        }

        Ok(())
    }

    /// 更新选中教师的工作副本
    fn record(
        pool: &mut HashMap<String, TeacherSupervisionInfo>,
        teacher_id: &str,
        day: NaiveDate,
        duty: DutyType,
    ) -> EngineResult<()> {
        pool.get_mut(teacher_id)
            .ok_or_else(|| EngineError::Internal(format!("选中教师不在池中: {}", teacher_id)))?
            .record_assignment(day, duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::priority::PriorityWeights;
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn processor() -> AssignmentProcessor {
        AssignmentProcessor::new(PriorityScorer::new(PriorityWeights::default()))
    }

    fn pool_of(infos: Vec<TeacherSupervisionInfo>) -> HashMap<String, TeacherSupervisionInfo> {
        infos
            .into_iter()
            .map(|info| (info.teacher_id.clone(), info))
            .collect()
    }

    fn idle(id: &str) -> TeacherSupervisionInfo {
        TeacherSupervisionInfo::new(id, format!("教师{}", id))
    }

    #[test]
    fn test_single_day_emits_six_rows_two_distinct_teachers() {
        let pool = pool_of(vec![idle("C"), idle("D"), idle("E")]);
        let monday = date(2025, 3, 3);

        let outcome = processor().process(&pool, &[monday]).unwrap();
        assert_eq!(outcome.drafts.len(), 6);

        let self_rows: Vec<_> = outcome
            .drafts
            .iter()
            .filter(|d| d.duty_type == DutyType::SelfStudySupervision)
            .collect();
        let leave_rows: Vec<_> = outcome
            .drafts
            .iter()
            .filter(|d| d.duty_type == DutyType::LeaveSeatSupervision)
            .collect();

        assert_eq!(self_rows.len(), 3);
        assert_eq!(leave_rows.len(), 3);

        // 每职责 3 条属于同一人,两职责属于不同人
        assert!(self_rows
            .iter()
            .all(|d| d.teacher_id == self_rows[0].teacher_id));
        assert!(leave_rows
            .iter()
            .all(|d| d.teacher_id == leave_rows[0].teacher_id));
        assert_ne!(self_rows[0].teacher_id, leave_rows[0].teacher_id);

        // 三个节次各出现一次
        let periods: Vec<Period> = self_rows.iter().map(|d| d.period).collect();
        for period in Period::ALL {
            assert!(periods.contains(&period));
        }
    }

    #[test]
    fn test_ban_day_is_hard_exclusion() {
        // 禁排周一的教师绝不出现在周一的结果中,即使其分数最高
        let mut banned = idle("A");
        banned.ban_weekdays.insert(Weekday::Mon);

        let pool = pool_of(vec![banned, idle("B"), idle("C")]);
        let monday = date(2025, 3, 3);

        let outcome = processor().process(&pool, &[monday]).unwrap();
        assert!(outcome.drafts.iter().all(|d| d.teacher_id != "A"));
    }

    #[test]
    fn test_no_assignment_on_banned_weekday_across_range() {
        let mut banned = idle("A");
        banned.ban_weekdays.insert(Weekday::Wed);

        let pool = pool_of(vec![banned, idle("B"), idle("C")]);
        // 周一~周四
        let dates: Vec<NaiveDate> = (3..=6).map(|d| date(2025, 3, d)).collect();

        let outcome = processor().process(&pool, &dates).unwrap();
        for draft in &outcome.drafts {
            if draft.teacher_id == "A" {
                assert_ne!(draft.day.weekday(), Weekday::Wed);
            }
        }
    }

    #[test]
    fn test_insufficient_after_ban_filter_aborts() {
        // 池 = {A(无禁排), B(禁排周一)},目标为某个周一
        // 过滤后只剩 A 一人,但一天需要两名不同教师 → 整批失败
        let mut b = idle("B");
        b.ban_weekdays.insert(Weekday::Mon);

        let pool = pool_of(vec![idle("A"), b]);
        let monday = date(2025, 3, 3);

        let err = processor().process(&pool, &[monday]).unwrap_err();
        match err {
            EngineError::InsufficientTeachers { day, eligible } => {
                assert_eq!(day, Some(monday));
                assert_eq!(eligible, 1);
            }
            other => panic!("期望 InsufficientTeachers, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_failure_on_later_date_discards_whole_batch() {
        // 第一天可行,第二天 (周二) 因禁排过滤而不足 → 无任何产出
        let mut b = idle("B");
        b.ban_weekdays.insert(Weekday::Tue);
        let mut c = idle("C");
        c.ban_weekdays.insert(Weekday::Tue);

        let pool = pool_of(vec![idle("A"), b, c]);
        let dates = vec![date(2025, 3, 3), date(2025, 3, 4)];

        let result = processor().process(&pool, &dates);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientTeachers { .. })
        ));
    }

    #[test]
    fn test_fairness_over_one_week_three_idle_teachers() {
        // 一个周一~周四,三名无历史无禁排教师:
        // 每天 2 人,4 天共 8 个名额,三人计数差不超过 1
        let pool = pool_of(vec![idle("C"), idle("D"), idle("E")]);
        let dates: Vec<NaiveDate> = (3..=6).map(|d| date(2025, 3, d)).collect();

        let outcome = processor().process(&pool, &dates).unwrap();

        // 每天恰好两名不同教师
        for &day in &dates {
            let todays: Vec<_> = outcome.drafts.iter().filter(|d| d.day == day).collect();
            assert_eq!(todays.len(), 6);
            let self_t = todays
                .iter()
                .find(|d| d.duty_type == DutyType::SelfStudySupervision)
                .unwrap();
            let leave_t = todays
                .iter()
                .find(|d| d.duty_type == DutyType::LeaveSeatSupervision)
                .unwrap();
            assert_ne!(self_t.teacher_id, leave_t.teacher_id);
        }

        let counts: Vec<u32> = ["C", "D", "E"]
            .iter()
            .map(|id| outcome.final_pool[*id].total_supervision_count)
            .collect();
        let max = *counts.iter().max().unwrap();
        let min = *counts.iter().min().unwrap();
        assert!(max - min <= 1, "计数不均衡: {:?}", counts);
        assert_eq!(counts.iter().sum::<u32>(), 8);
    }

    #[test]
    fn test_final_pool_counts_equal_initial_plus_times_chosen() {
        let mut seasoned = idle("A");
        seasoned.total_supervision_count = 5;
        seasoned
            .duty_type_counts
            .insert(DutyType::SelfStudySupervision, 5);

        let pool = pool_of(vec![seasoned, idle("B"), idle("C")]);
        let dates: Vec<NaiveDate> = (3..=6).map(|d| date(2025, 3, d)).collect();

        let outcome = processor().process(&pool, &dates).unwrap();

        for (id, info) in &outcome.final_pool {
            let times_chosen = outcome
                .drafts
                .iter()
                .filter(|d| d.teacher_id == *id && d.period == Period::Seventh)
                .count() as u32;
            let initial = pool[id].total_supervision_count;
            assert_eq!(info.total_supervision_count, initial + times_chosen);
        }
    }

    #[test]
    fn test_working_copy_state_carries_between_dates() {
        // 第一天当选的两人在第二天应让位给未当选者
        let pool = pool_of(vec![idle("A"), idle("B"), idle("C")]);
        let dates = vec![date(2025, 3, 3), date(2025, 3, 4)];

        let outcome = processor().process(&pool, &dates).unwrap();

        let day1_ids: Vec<&str> = outcome
            .drafts
            .iter()
            .filter(|d| d.day == dates[0] && d.period == Period::Seventh)
            .map(|d| d.teacher_id.as_str())
            .collect();
        let day2_self = outcome
            .drafts
            .iter()
            .find(|d| {
                d.day == dates[1]
                    && d.duty_type == DutyType::SelfStudySupervision
                    && d.period == Period::Seventh
            })
            .unwrap();

        // 第一天未当选者 (恰一人) 第二天必为自习监督 (新近度最大)
        let absent = ["A", "B", "C"]
            .into_iter()
            .find(|id| !day1_ids.contains(id))
            .unwrap();
        assert_eq!(day2_self.teacher_id, absent);
    }

    #[test]
    fn test_initial_pool_is_not_mutated() {
        let pool = pool_of(vec![idle("A"), idle("B")]);
        let dates = vec![date(2025, 3, 3)];

        processor().process(&pool, &dates).unwrap();

        // 入参池保持原状 (折叠只改工作副本)
        assert!(pool.values().all(|info| info.total_supervision_count == 0
            && info.last_supervision_date.is_none()));
    }
}
