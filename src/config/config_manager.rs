// ==========================================
// 学校监督排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::assign_config_trait::AssignConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::ExistingSchedulePolicy;
use crate::engine::priority::{PriorityWeights, PriorityWeightsOverride};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 优先级权重配置键
pub const KEY_PRIORITY_WEIGHTS: &str = "assign/priority_weights";
/// 重复排班策略配置键
pub const KEY_EXISTING_SCHEDULE_POLICY: &str = "assign/existing_schedule_policy";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = open_sqlite_connection(db_path).context("打开配置数据库失败")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致,会对传入连接再次应用统一 PRAGMA (幂等)。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        {
            let guard = conn.lock().map_err(|e| anyhow!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    fn get_config_value(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值 (存在则覆盖)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        Ok(())
    }
}

#[async_trait]
impl AssignConfigReader for ConfigManager {
    async fn get_priority_weights(&self) -> anyhow::Result<PriorityWeights> {
        match self.get_config_value(KEY_PRIORITY_WEIGHTS)? {
            None => Ok(PriorityWeights::default()),
            Some(raw) => {
                let partial: PriorityWeightsOverride = serde_json::from_str(&raw)
                    .with_context(|| format!("解析配置失败: {}", KEY_PRIORITY_WEIGHTS))?;
                Ok(partial.merge_over_defaults())
            }
        }
    }

    async fn get_existing_schedule_policy(&self) -> anyhow::Result<ExistingSchedulePolicy> {
        match self.get_config_value(KEY_EXISTING_SCHEDULE_POLICY)? {
            None => Ok(ExistingSchedulePolicy::Skip),
            Some(raw) => ExistingSchedulePolicy::parse(raw.trim())
                .map_err(|e| anyhow!("解析配置失败: {}: {}", KEY_EXISTING_SCHEDULE_POLICY, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_priority_weights_default_when_absent() {
        let mgr = manager();
        let weights = mgr.get_priority_weights().await.unwrap();
        assert_eq!(
            weights.recency_weight,
            PriorityWeights::default().recency_weight
        );
    }

    #[tokio::test]
    async fn test_priority_weights_partial_override() {
        let mgr = manager();
        mgr.set_global_config_value(KEY_PRIORITY_WEIGHTS, r#"{"totalCountWeight": 9.0}"#)
            .unwrap();

        // serde 字段为 snake_case, camelCase 键不匹配 → 全默认
        let weights = mgr.get_priority_weights().await.unwrap();
        assert_eq!(
            weights.total_count_weight,
            PriorityWeights::default().total_count_weight
        );

        mgr.set_global_config_value(KEY_PRIORITY_WEIGHTS, r#"{"total_count_weight": 9.0}"#)
            .unwrap();
        let weights = mgr.get_priority_weights().await.unwrap();
        assert_eq!(weights.total_count_weight, 9.0);
        assert_eq!(
            weights.recency_weight,
            PriorityWeights::default().recency_weight
        );
    }

    #[tokio::test]
    async fn test_existing_schedule_policy_default_and_override() {
        let mgr = manager();
        assert_eq!(
            mgr.get_existing_schedule_policy().await.unwrap(),
            ExistingSchedulePolicy::Skip
        );

        mgr.set_global_config_value(KEY_EXISTING_SCHEDULE_POLICY, "ABORT")
            .unwrap();
        assert_eq!(
            mgr.get_existing_schedule_policy().await.unwrap(),
            ExistingSchedulePolicy::Abort
        );
    }

    #[tokio::test]
    async fn test_invalid_policy_value_is_error() {
        let mgr = manager();
        mgr.set_global_config_value(KEY_EXISTING_SCHEDULE_POLICY, "MERGE")
            .unwrap();
        assert!(mgr.get_existing_schedule_policy().await.is_err());
    }
}
