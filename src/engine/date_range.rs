// ==========================================
// 学校监督排班系统 - 目标日期提取
// ==========================================
// 职责: 提取日期区间内的周一~周四工作日
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};

// ==========================================
// DateRangeExtractor - 纯函数工具类
// ==========================================
pub struct DateRangeExtractor;

impl DateRangeExtractor {
    /// 提取区间内的监督日 (周一~周四)
    ///
    /// # 规则
    /// - 返回 [start, end] 内所有星期为 Mon/Tue/Wed/Thu 的日期
    /// - 严格升序,无重复
    /// - start > end 时返回空列表
    ///
    /// # 前置条件
    /// 区间合法性 (非空输入、跨度上限) 由调用方负责校验。
    pub fn extract_weekdays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if Self::is_supervision_weekday(current.weekday()) {
                days.push(current);
            }
            current += Duration::days(1);
        }

        days
    }

    /// 是否为监督日星期 (周一~周四)
    pub fn is_supervision_weekday(weekday: Weekday) -> bool {
        matches!(
            weekday,
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
        )
    }
}
