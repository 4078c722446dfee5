// ==========================================
// 学校监督排班系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键/忙等)
// - 集中建表语句,应用与测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 建表顺序遵循外键依赖: teacher → ban_day/schedule → exchange。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS teacher (
            teacher_id TEXT PRIMARY KEY,
            teacher_name TEXT NOT NULL,
            role TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS teacher_ban_day (
            teacher_id TEXT NOT NULL REFERENCES teacher(teacher_id) ON DELETE CASCADE,
            weekday TEXT NOT NULL,
            PRIMARY KEY (teacher_id, weekday)
        );

        CREATE TABLE IF NOT EXISTS supervision_schedule (
            schedule_id TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL REFERENCES teacher(teacher_id),
            day TEXT NOT NULL,
            period TEXT NOT NULL,
            duty_type TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_supervision_schedule_day
            ON supervision_schedule(day);
        CREATE INDEX IF NOT EXISTS idx_supervision_schedule_teacher
            ON supervision_schedule(teacher_id);

        CREATE TABLE IF NOT EXISTS supervision_exchange (
            exchange_id TEXT PRIMARY KEY,
            sender_teacher_id TEXT NOT NULL REFERENCES teacher(teacher_id),
            recipient_teacher_id TEXT NOT NULL REFERENCES teacher(teacher_id),
            sender_schedule_id TEXT NOT NULL REFERENCES supervision_schedule(schedule_id),
            recipient_schedule_id TEXT NOT NULL REFERENCES supervision_schedule(schedule_id),
            reason TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_supervision_exchange_sender
            ON supervision_exchange(sender_teacher_id);
        CREATE INDEX IF NOT EXISTS idx_supervision_exchange_recipient
            ON supervision_exchange(recipient_teacher_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
