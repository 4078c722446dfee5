// ==========================================
// 学校监督排班系统 - 候选池加载器
// ==========================================
// 职责: 从花名册/禁排日/排班历史组装候选池
// 协作方: TeacherRepository (花名册、禁排日),
//         ScheduleRepository (历史聚合)
// ==========================================

use crate::domain::teacher::TeacherSupervisionInfo;
use crate::engine::assignment::MIN_TEACHERS_PER_DAY;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::schedule_repo::ScheduleRepository;
use crate::repository::teacher_repo::TeacherRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

// ==========================================
// TeacherPoolLoader - 候选池加载器
// ==========================================
pub struct TeacherPoolLoader {
    teacher_repo: Arc<TeacherRepository>,
    schedule_repo: Arc<ScheduleRepository>,
}

impl TeacherPoolLoader {
    /// 构造加载器
    pub fn new(
        teacher_repo: Arc<TeacherRepository>,
        schedule_repo: Arc<ScheduleRepository>,
    ) -> Self {
        Self {
            teacher_repo,
            schedule_repo,
        }
    }

    /// 加载候选池
    ///
    /// 对每名在职监督教师组装:
    /// - 禁排星期集合
    /// - 最近监督日期 (跨职责取最大,无历史为 None)
    /// - 累计/分职责监督次数 (按"日期×职责"口径)
    ///
    /// # 错误
    /// - InsufficientTeachers: 池不足 2 人 (一天需要 2 名不同教师)
    pub fn load(&self) -> EngineResult<HashMap<String, TeacherSupervisionInfo>> {
        let teachers = self.teacher_repo.list_active_supervisors()?;

        if teachers.len() < MIN_TEACHERS_PER_DAY {
            return Err(EngineError::InsufficientTeachers {
                day: None,
                eligible: teachers.len(),
            });
        }

        let mut pool = HashMap::with_capacity(teachers.len());

        for teacher in teachers {
            let ban_weekdays = self.teacher_repo.find_ban_weekdays(&teacher.teacher_id)?;
            let stats = self.schedule_repo.supervision_stats(&teacher.teacher_id)?;

            pool.insert(
                teacher.teacher_id.clone(),
                TeacherSupervisionInfo {
                    teacher_id: teacher.teacher_id,
                    teacher_name: teacher.teacher_name,
                    ban_weekdays,
                    last_supervision_date: stats.last_supervision_date,
                    total_supervision_count: stats.total_count,
                    duty_type_counts: stats.duty_type_counts,
                },
            );
        }

        info!(pool_size = pool.len(), "候选池加载完成");

        Ok(pool)
    }
}
