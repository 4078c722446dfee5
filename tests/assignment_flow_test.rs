// ==========================================
// 自动排班全流程测试
// ==========================================
// 职责: 验证 区间校验 → 候选池 → 贪心分配 → 落库 → 报告
//       的端到端行为,含失败回滚与重复排班策略
// ==========================================


#[cfg(test)]
mod assignment_flow_test {
    use chrono::Weekday;
    use std::sync::Arc;
    use supervision_scheduler::api::assign_api::{AutoAssignRequest, SupervisionAssignApi};
    use supervision_scheduler::api::error::ApiError;
    use supervision_scheduler::config::config_manager::{
        ConfigManager, KEY_EXISTING_SCHEDULE_POLICY, KEY_PRIORITY_WEIGHTS,
    };
    use supervision_scheduler::domain::types::DutyType;
    use supervision_scheduler::repository::schedule_repo::ScheduleRepository;
    use supervision_scheduler::repository::teacher_repo::TeacherRepository;
    use tempfile::NamedTempFile;

    use crate::test_helpers::{create_test_db, date, seed_duty_day, seed_supervisor};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    struct TestEnv {
        _temp_file: NamedTempFile,
        teacher_repo: Arc<TeacherRepository>,
        schedule_repo: Arc<ScheduleRepository>,
        config_manager: Arc<ConfigManager>,
        assign_api: SupervisionAssignApi<ConfigManager>,
    }

    /// 创建测试环境
    fn setup_test_env() -> TestEnv {
        let (temp_file, conn) = create_test_db().unwrap();

        let teacher_repo = Arc::new(TeacherRepository::new(conn.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());

        let assign_api = SupervisionAssignApi::new(
            teacher_repo.clone(),
            schedule_repo.clone(),
            config_manager.clone(),
        );

        TestEnv {
            _temp_file: temp_file,
            teacher_repo,
            schedule_repo,
            config_manager,
            assign_api,
        }
    }

    fn request(start: (i32, u32, u32), end: (i32, u32, u32)) -> AutoAssignRequest {
        AutoAssignRequest {
            start_day: Some(date(start.0, start.1, start.2)),
            end_day: Some(date(end.0, end.1, end.2)),
        }
    }

    // ==========================================
    // 测试1: 一周排班的完整流程
    // ==========================================

    #[tokio::test]
    async fn test_one_week_assignment_happy_path() {
        let env = setup_test_env();
        for (id, name) in [("C", "박지훈"), ("D", "이서연"), ("E", "최민준")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }

        // 2025-03-03(一) ~ 2025-03-09(日): 监督日为一~四
        let reports = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 9)))
            .await
            .unwrap();

        // 4 个监督日,按日升序
        assert_eq!(reports.len(), 4);
        for pair in reports.windows(2) {
            assert!(pair[0].day < pair[1].day);
        }

        // 每天两名不同教师
        for report in &reports {
            assert_ne!(
                report.self_study_supervision.teacher.id,
                report.leave_seat_supervision.teacher.id
            );
        }

        // 每天 6 行 (2 职责 × 3 节次),共 24 行
        assert_eq!(env.schedule_repo.count_all().unwrap(), 24);

        // 报告中的 scheduleId 指向真实落库的第7节记录
        let first = &reports[0];
        let row = env
            .schedule_repo
            .find_by_id(&first.self_study_supervision.schedule_id)
            .unwrap()
            .expect("报告中的 scheduleId 必须已落库");
        assert_eq!(row.teacher_id, first.self_study_supervision.teacher.id);
        assert_eq!(row.duty_type, DutyType::SelfStudySupervision);
        assert_eq!(row.day, first.day);

        // 4 天 8 个名额摊给 3 人,次数差不超过 1
        let counts: Vec<u32> = ["C", "D", "E"]
            .iter()
            .map(|id| env.schedule_repo.supervision_stats(id).unwrap().total_count)
            .collect();
        let max = *counts.iter().max().unwrap();
        let min = *counts.iter().min().unwrap();
        assert!(max - min <= 1, "计数不均衡: {:?}", counts);
    }

    // ==========================================
    // 测试2: 禁排日硬约束
    // ==========================================

    #[tokio::test]
    async fn test_banned_teacher_never_assigned_on_ban_day() {
        let env = setup_test_env();
        for (id, name) in [("A", "김하늘"), ("B", "정우진"), ("C", "한소희")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }
        env.teacher_repo.add_ban_weekday("A", Weekday::Mon).unwrap();
        env.teacher_repo.add_ban_weekday("A", Weekday::Wed).unwrap();

        env.assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 13)))
            .await
            .unwrap();

        // A 的所有落库记录都不在周一/周三
        for day in [
            date(2025, 3, 3),
            date(2025, 3, 5),
            date(2025, 3, 10),
            date(2025, 3, 12),
        ] {
            let rows = env.schedule_repo.list_by_day(day).unwrap();
            assert!(!rows.is_empty());
            assert!(rows.iter().all(|r| r.teacher_id != "A"));
        }
    }

    // ==========================================
    // 测试3: 日期区间校验
    // ==========================================

    #[tokio::test]
    async fn test_invalid_date_range_rejected_before_any_work() {
        let env = setup_test_env();
        seed_supervisor(&env.teacher_repo, "A", "김하늘").unwrap();
        seed_supervisor(&env.teacher_repo, "B", "정우진").unwrap();

        // 缺失端点
        let missing = AutoAssignRequest {
            start_day: None,
            end_day: Some(date(2025, 3, 3)),
        };
        assert!(matches!(
            env.assign_api.auto_assign(&missing).await,
            Err(ApiError::InvalidDateRange(_))
        ));

        // 倒序
        assert!(matches!(
            env.assign_api
                .auto_assign(&request((2025, 3, 10), (2025, 3, 3)))
                .await,
            Err(ApiError::InvalidDateRange(_))
        ));

        // 跨度超过 365 天
        assert!(matches!(
            env.assign_api
                .auto_assign(&request((2025, 1, 1), (2026, 6, 1)))
                .await,
            Err(ApiError::InvalidDateRange(_))
        ));

        // 任何校验失败都不落库
        assert_eq!(env.schedule_repo.count_all().unwrap(), 0);
    }

    // ==========================================
    // 测试4: 候选池不足
    // ==========================================

    #[tokio::test]
    async fn test_pool_smaller_than_two_fails() {
        let env = setup_test_env();
        seed_supervisor(&env.teacher_repo, "A", "김하늘").unwrap();

        let err = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap_err();

        match err {
            ApiError::InsufficientTeachers { day, eligible } => {
                assert_eq!(day, None); // 池整体不足,与具体日期无关
                assert_eq!(eligible, 1);
            }
            other => panic!("期望 InsufficientTeachers, 实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ban_filter_starves_single_date() {
        // 池 = {A(无禁排), B(禁排周一)},目标为一个周一:
        // 过滤后只剩 1 人 → InsufficientTeachers
        let env = setup_test_env();
        seed_supervisor(&env.teacher_repo, "A", "김하늘").unwrap();
        seed_supervisor(&env.teacher_repo, "B", "정우진").unwrap();
        env.teacher_repo.add_ban_weekday("B", Weekday::Mon).unwrap();

        let err = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap_err();

        match err {
            ApiError::InsufficientTeachers { day, eligible } => {
                assert_eq!(day, Some(date(2025, 3, 3)));
                assert_eq!(eligible, 1);
            }
            other => panic!("期望 InsufficientTeachers, 实际 {:?}", other),
        }
        assert_eq!(env.schedule_repo.count_all().unwrap(), 0);
    }

    // ==========================================
    // 测试5: 中途失败整批回滚
    // ==========================================

    #[tokio::test]
    async fn test_failure_on_later_date_leaves_no_rows() {
        // 周一可排 (3人),周二经禁排过滤只剩 1 人 → 整批失败,
        // 周一已生成的草稿也不得落库
        let env = setup_test_env();
        for (id, name) in [("A", "김하늘"), ("B", "정우진"), ("C", "한소희")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }
        env.teacher_repo.add_ban_weekday("B", Weekday::Tue).unwrap();
        env.teacher_repo.add_ban_weekday("C", Weekday::Tue).unwrap();

        let err = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 4)))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InsufficientTeachers { .. }));
        assert_eq!(env.schedule_repo.count_all().unwrap(), 0);
    }

    // ==========================================
    // 测试6: 重复排班策略 SKIP / ABORT
    // ==========================================

    #[tokio::test]
    async fn test_skip_policy_passes_over_scheduled_dates() {
        let env = setup_test_env();
        for (id, name) in [("A", "김하늘"), ("B", "정우진"), ("C", "한소희")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }

        // 先排周一
        let first = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(env.schedule_repo.count_all().unwrap(), 6);

        // 默认 SKIP: 再排周一~周二,周一被跳过,只新增周二
        let second = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 4)))
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].day, date(2025, 3, 4));
        assert_eq!(env.schedule_repo.count_all().unwrap(), 12);

        // 整个区间都已排过 → 空报告,无新增
        let third = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 4)))
            .await
            .unwrap();
        assert!(third.is_empty());
        assert_eq!(env.schedule_repo.count_all().unwrap(), 12);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_on_scheduled_date() {
        let env = setup_test_env();
        for (id, name) in [("A", "김하늘"), ("B", "정우진"), ("C", "한소희")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }

        env.assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap();
        let rows_before = env.schedule_repo.count_all().unwrap();

        env.config_manager
            .set_global_config_value(KEY_EXISTING_SCHEDULE_POLICY, "ABORT")
            .unwrap();

        let err = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 4)))
            .await
            .unwrap_err();

        match err {
            ApiError::ScheduleAlreadyExists(day) => assert_eq!(day, date(2025, 3, 3)),
            other => panic!("期望 ScheduleAlreadyExists, 实际 {:?}", other),
        }
        assert_eq!(env.schedule_repo.count_all().unwrap(), rows_before);
    }

    // ==========================================
    // 测试7: 历史与权重影响排序
    // ==========================================

    #[tokio::test]
    async fn test_fresh_teacher_preferred_over_history() {
        let env = setup_test_env();
        for (id, name) in [("C", "박지훈"), ("D", "이서연"), ("E", "최민준")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }

        // C/D 已有历史,E 无历史 → 下一个监督日 E 必为自习监督
        seed_duty_day(
            &env.schedule_repo,
            "C",
            date(2025, 2, 27),
            DutyType::SelfStudySupervision,
        )
        .unwrap();
        seed_duty_day(
            &env.schedule_repo,
            "D",
            date(2025, 2, 27),
            DutyType::LeaveSeatSupervision,
        )
        .unwrap();

        let reports = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap();

        assert_eq!(reports[0].self_study_supervision.teacher.id, "E");
    }

    #[tokio::test]
    async fn test_config_weights_change_ranking() {
        let env = setup_test_env();
        for (id, name) in [("A", "김하늘"), ("B", "정우진")] {
            seed_supervisor(&env.teacher_repo, id, name).unwrap();
        }

        // A 的自习次数多但离座为 0; B 反之
        seed_duty_day(
            &env.schedule_repo,
            "A",
            date(2025, 2, 26),
            DutyType::SelfStudySupervision,
        )
        .unwrap();
        seed_duty_day(
            &env.schedule_repo,
            "B",
            date(2025, 2, 26),
            DutyType::LeaveSeatSupervision,
        )
        .unwrap();

        // 职责维度权重拉满 → 自习名额归 B (其自习次数为 0)
        env.config_manager
            .set_global_config_value(KEY_PRIORITY_WEIGHTS, r#"{"duty_count_weight": 100.0}"#)
            .unwrap();

        let reports = env
            .assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 3)))
            .await
            .unwrap();

        assert_eq!(reports[0].self_study_supervision.teacher.id, "B");
        assert_eq!(reports[0].leave_seat_supervision.teacher.id, "A");
    }

    // ==========================================
    // 测试8: 非监督教师不进入候选池
    // ==========================================

    #[tokio::test]
    async fn test_inactive_and_non_supervisor_excluded() {
        let env = setup_test_env();
        seed_supervisor(&env.teacher_repo, "A", "김하늘").unwrap();
        seed_supervisor(&env.teacher_repo, "B", "정우진").unwrap();

        // 离职教师与非监督角色不参与排班
        {
            use supervision_scheduler::domain::teacher::Teacher;
            env.teacher_repo
                .insert(&Teacher {
                    teacher_id: "X".to_string(),
                    teacher_name: "휴직교사".to_string(),
                    role: "SUPERVISOR".to_string(),
                    active: false,
                })
                .unwrap();
            env.teacher_repo
                .insert(&Teacher {
                    teacher_id: "Y".to_string(),
                    teacher_name: "행정교사".to_string(),
                    role: "STAFF".to_string(),
                    active: true,
                })
                .unwrap();
        }

        env.assign_api
            .auto_assign(&request((2025, 3, 3), (2025, 3, 6)))
            .await
            .unwrap();

        for day in (3..=6).map(|d| date(2025, 3, d)) {
            let rows = env.schedule_repo.list_by_day(day).unwrap();
            assert!(rows
                .iter()
                .all(|r| r.teacher_id == "A" || r.teacher_id == "B"));
        }
    }
}
