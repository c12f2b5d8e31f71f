// ==========================================
// 食物库导入器 - 命令行入口
// ==========================================
// 用法:
//   food-importer <fichier.csv|fichier.txt> [db_path]
//
// db_path 缺省时使用 FOOD_IMPORTER_DB_PATH 或用户数据目录
// 存在行级错误时写出 <fichier>.errors.csv
// ==========================================

use anyhow::Context;
use food_importer::app::{get_default_db_path, AppState};
use food_importer::importer::{FoodImporter, ImportReport};
use food_importer::logging;
use food_importer::ImportStats;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: food-importer <fichier.csv|fichier.txt> [db_path]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    let mut args = std::env::args().skip(1);
    let file_path = match args.next() {
        Some(path) if path != "-h" && path != "--help" => PathBuf::from(path),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!("食物库导入器 v{}", food_importer::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path.clone())
        .await
        .with_context(|| format!("Impossible d'ouvrir la base {}", db_path))?;

    let importer = state
        .build_importer()?
        .with_progress_callback(Box::new(|stats: &ImportStats| {
            tracing::info!(
                processed = stats.processed,
                total = stats.total,
                successful = stats.successful,
                errors = stats.errors,
                "进度 {:.0}%",
                stats.progress_percent()
            );
        }));

    let outcome = importer.import_from_file(&file_path).await?;

    let report = ImportReport::new(&outcome, state.max_displayed_errors().await?);
    println!("{}", report.summary());
    for line in report.error_lines() {
        println!("  {}", line);
    }

    if !outcome.errors.is_empty() {
        let errors_path = errors_report_path(&file_path);
        report
            .write_errors_csv_to_path(&errors_path)
            .with_context(|| format!("Écriture de {} impossible", errors_path.display()))?;
        println!("Détail des erreurs: {}", errors_path.display());
    }

    Ok(())
}

fn errors_report_path(file_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.errors.csv", file_path.display()))
}
