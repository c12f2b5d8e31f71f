// ==========================================
// FoodImporter 集成测试
// ==========================================
// 测试目标: 验证完整的食物导入流程（文件 → 映射 → 校验 → 入库 → 批次记录）
// ==========================================

mod test_helpers;

use food_importer::importer::{FoodImporter, ImportError, ImportReport};
use food_importer::logging;
use food_importer::repository::{FoodImportRepository, FoodImportRepositoryImpl};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_helpers::{
    build_semicolon_csv, create_importer_with, create_test_db, create_test_importer,
    insert_test_config, open_test_connection, write_temp_csv, MockConfig,
};

#[tokio::test]
async fn test_import_single_semicolon_row() {
    // 初始化日志系统
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).expect("Failed to insert test config");

    let importer = create_test_importer(conn.clone());
    let csv = write_temp_csv("nom;kcal;proteines\nPomme;52;0,3\n").unwrap();

    let outcome = importer
        .import_from_file(csv.path())
        .await
        .expect("Import should succeed");

    assert_eq!(outcome.successful, 1);
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.stats.processed, 1);

    let food = importer
        .food_repo()
        .find_food_by_name("Pomme")
        .await
        .unwrap()
        .expect("Pomme should be stored");
    assert_eq!(food.calories, 52.0);
    assert_eq!(food.protein, 0.3);
    assert_eq!(food.carbs, 0.0);
    assert_eq!(food.fat, 0.0);
    assert_eq!(food.salt, 0.0);
}

#[tokio::test]
async fn test_header_only_file_is_fatal() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    let importer = create_test_importer(conn);

    // 表头本身无法识别，证明在列映射之前就已中止
    let csv = write_temp_csv("colonne_inconnue;kcal\n\n   \n").unwrap();
    let result = importer.import_from_file(csv.path()).await;

    match result {
        Err(ImportError::EmptyFile) => {}
        other => panic!("expected EmptyFile, got {:?}", other.map(|o| o.successful)),
    }
    assert_eq!(
        ImportError::EmptyFile.to_string(),
        "Fichier vide ou invalide"
    );
    assert_eq!(importer.food_repo().count_foods().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_name_column_is_fatal() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    let importer = create_test_importer(conn);

    let result = importer
        .import_from_text("kcal;proteines\n52;0,3\n", Some("sans_nom.csv"))
        .await;

    let err = result.expect_err("import should abort");
    assert!(matches!(err, ImportError::NameColumnMissing { .. }));
    assert!(err.to_string().contains("kcal, proteines"));
    assert!(importer.food_repo().get_recent_batches(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ten_rows_with_empty_name_on_row_four() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let importer = create_test_importer(conn);
    let content = build_semicolon_csv(10, &[4]);

    let outcome = importer.import_from_text(&content, None).await.unwrap();

    assert_eq!(outcome.stats.processed, 10);
    assert_eq!(outcome.successful, 9);
    assert_eq!(outcome.errors.len(), 1);
    // 数据第 4 行 = 文件第 5 行（含表头）
    assert_eq!(outcome.errors[0].row, 5);
    assert_eq!(outcome.errors[0].error, "Nom manquant");
    assert_eq!(importer.food_repo().count_foods().await.unwrap(), 9);
}

#[tokio::test]
async fn test_invalid_names_are_reported_not_inserted() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let importer = create_test_importer(conn);
    let long_name = "x".repeat(201);
    let content = format!(
        "Nom\tÉnergie\n123\t10\nPomme:::verte\t20\nA\t30\n{}\t40\nBanane\ttraces\n",
        long_name
    );

    let outcome = importer.import_from_text(&content, None).await.unwrap();

    assert_eq!(outcome.successful, 1);
    let rows: Vec<usize> = outcome.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![2, 3, 4, 5]);
    assert!(outcome.errors[0].error.contains("purement numérique"));
    assert!(outcome.errors[1].error.contains(":::"));
    assert!(outcome.errors[2].error.contains("trop court"));
    assert!(outcome.errors[3].error.contains("trop long"));
    // 行级错误附带部分解析的记录
    assert_eq!(outcome.errors[1].data["calories"], 20.0);

    let banane = importer
        .food_repo()
        .find_food_by_name("Banane")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(banane.calories, 0.0);
}

#[tokio::test]
async fn test_category_mapping_and_comma_separated_quotes() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let importer = create_test_importer(conn);
    let content = "name,category,calories\n\
                   \"Saumon, fumé\",Poissons cuits,180\n\
                   Gâteau basque,Gâteaux,420\n\
                   Eau de source,Eaux,0\n\
                   Mystère,,12\n";

    let outcome = importer.import_from_text(content, None).await.unwrap();
    assert_eq!(outcome.successful, 4, "errors: {:?}", outcome.errors);

    let repo = importer.food_repo();
    let category = |food: Option<food_importer::FoodRecord>| food.unwrap().category;
    assert_eq!(
        category(repo.find_food_by_name("Saumon, fumé").await.unwrap()),
        "proteins"
    );
    assert_eq!(
        category(repo.find_food_by_name("Gâteau basque").await.unwrap()),
        "snacks"
    );
    assert_eq!(
        category(repo.find_food_by_name("Eau de source").await.unwrap()),
        "beverages"
    );
    assert_eq!(
        category(repo.find_food_by_name("Mystère").await.unwrap()),
        "snacks"
    );
}

#[tokio::test]
async fn test_import_batch_recorded_and_report() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let importer = create_test_importer(conn);
    let content = build_semicolon_csv(25, &[3, 7, 11, 15, 19, 20, 21, 22, 23, 24, 25]);

    let outcome = importer
        .import_from_text(&content, Some("ciqual_extrait.csv"))
        .await
        .unwrap();
    assert_eq!(outcome.successful, 14);
    assert_eq!(outcome.errors.len(), 11);

    let batches = importer.food_repo().get_recent_batches(1).await.unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].batch_id, outcome.batch_id);
    assert_eq!(batches[0].file_name.as_deref(), Some("ciqual_extrait.csv"));
    assert_eq!(batches[0].total_rows, 25);
    assert_eq!(batches[0].success_rows, 14);
    assert_eq!(batches[0].error_rows, 11);
    assert!(batches[0].errors_json.is_some());

    let report = ImportReport::new(&outcome, 10);
    let lines = report.error_lines();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[10], "... et 1 autre(s) erreur(s)");
}

#[tokio::test]
async fn test_progress_callback_called_per_batch() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let importer = create_test_importer(conn).with_progress_callback(Box::new(
        move |stats: &food_importer::ImportStats| {
            sink.lock().unwrap().push(stats.processed);
        },
    ));

    importer
        .import_from_text(&build_semicolon_csv(23, &[]), None)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 23]);
}

#[tokio::test]
async fn test_short_row_reported_as_malformed() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn.lock().unwrap()).unwrap();

    let importer = create_test_importer(conn);
    let outcome = importer
        .import_from_text("nom;kcal;proteines\nPomme\n", None)
        .await
        .unwrap();

    assert_eq!(outcome.successful, 0);
    assert_eq!(outcome.stats.processed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].row, 2);
    assert!(outcome.errors[0].error.starts_with("Ligne mal formée"));
    assert_eq!(importer.food_repo().count_foods().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pause_only_between_batches() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");

    let config = MockConfig {
        batch_delay_ms: 100,
        ..MockConfig::default()
    };
    let start = tokio::time::Instant::now();
    let marks = Arc::new(Mutex::new(Vec::new()));
    let sink = marks.clone();
    let importer = create_importer_with(
        FoodImportRepositoryImpl::from_connection(conn.clone()),
        config,
        conn,
    )
    .with_progress_callback(Box::new(move |_stats: &food_importer::ImportStats| {
        sink.lock().unwrap().push(start.elapsed());
    }));

    // 25 行 = 3 个批次 → 2 次停顿
    let outcome = importer
        .import_from_text(&build_semicolon_csv(25, &[]), None)
        .await
        .unwrap();

    assert_eq!(outcome.successful, 25);
    assert_eq!(start.elapsed(), Duration::from_millis(200));
    assert_eq!(
        *marks.lock().unwrap(),
        vec![
            Duration::ZERO,
            Duration::from_millis(100),
            Duration::from_millis(200)
        ]
    );
}
