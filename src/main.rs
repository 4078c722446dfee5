// ==========================================
// 学校监督排班系统 - 命令行入口
// ==========================================
// 用法: supervision-scheduler <startDay> <endDay>
// 对给定区间执行一次自动排班,结果以 JSON 输出
// ==========================================

use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use supervision_scheduler::api::assign_api::{AutoAssignRequest, SupervisionAssignApi};
use supervision_scheduler::config::config_manager::ConfigManager;
use supervision_scheduler::repository::schedule_repo::ScheduleRepository;
use supervision_scheduler::repository::teacher_repo::TeacherRepository;
use supervision_scheduler::{db, logging};

/// 数据库路径: 环境变量 SUPERVISION_DB 优先,否则落到应用数据目录
fn resolve_db_path() -> String {
    if let Ok(path) = std::env::var("SUPERVISION_DB") {
        return path;
    }

    let mut dir = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    dir.push("supervision-scheduler");
    let _ = std::fs::create_dir_all(&dir);
    dir.push("supervision.db");
    dir.to_string_lossy().to_string()
}

fn parse_arg_date(arg: Option<String>, name: &str) -> anyhow::Result<NaiveDate> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("缺少参数: {}", name))?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("参数 {} 不是合法 ISO 日期 ({}): {}", name, raw, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", supervision_scheduler::APP_NAME);
    tracing::info!("系统版本: {}", supervision_scheduler::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let start = parse_arg_date(args.next(), "startDay")?;
    let end = parse_arg_date(args.next(), "endDay")?;

    let db_path = resolve_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    if let Some(version) = read_schema_version(&conn)? {
        tracing::info!("schema_version: {}", version);
    }

    let teacher_repo = Arc::new(TeacherRepository::new(conn.clone()));
    let schedule_repo = Arc::new(ScheduleRepository::new(conn.clone()));
    let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);

    let assign_api = SupervisionAssignApi::new(teacher_repo, schedule_repo, config_manager);

    let request = AutoAssignRequest {
        start_day: Some(start),
        end_day: Some(end),
    };

    match assign_api.auto_assign(&request).await {
        Ok(reports) => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("自动排班失败: {}", e);
            Err(e.into())
        }
    }
}

fn read_schema_version(conn: &Arc<Mutex<Connection>>) -> anyhow::Result<Option<i64>> {
    let guard = conn
        .lock()
        .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;
    Ok(db::read_schema_version(&guard)?)
}
