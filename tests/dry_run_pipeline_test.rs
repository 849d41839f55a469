/// dry-runパイプラインの統合テスト
///
/// リポジトリに同梱されたdata/init.jsonとsql/ファイルを使い、
/// 読み込み → フラット化 → 組み立て → dry-run出力までを
/// データベース接続なしで検証します。
use groundwork::cli::commands::migrate::{MigrateCommand, MigrateCommandHandler};
use groundwork::core::config::ConnectionConfig;
use groundwork::services::menu_flattener::MenuFlattenerService;
use groundwork::services::menu_source::MenuSourceLoader;
use std::path::{Path, PathBuf};

fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_shipped_init_json_loads_and_flattens() {
    let loader = MenuSourceLoader::new();
    let menus_data = loader
        .load(&project_root().join("data/init.json"))
        .unwrap();

    let flattener = MenuFlattenerService::new();
    let rows = flattener.flatten(&menus_data);
    assert!(!rows.is_empty());

    // サイドバーは素のID、補助メニューは接頭辞付きID
    assert!(rows.iter().any(|r| r.id == "home"));
    assert!(rows.iter().any(|r| r.id == "shop-products"));
    assert!(rows.iter().any(|r| r.id == "top-search"));
    assert!(rows.iter().any(|r| r.id == "bottom-chat"));
    assert!(rows.iter().any(|r| r.id == "header-cart"));

    // 子は必ず既出の親を参照する
    let (parents, children) = flattener.partition(rows);
    let parent_ids: Vec<&str> = parents.iter().map(|r| r.id.as_str()).collect();
    for child in &children {
        let parent_id = child.parent_id.as_deref().unwrap();
        assert!(
            parent_ids.contains(&parent_id),
            "child {} references unknown parent {}",
            child.id,
            parent_id
        );
    }
}

#[test]
fn test_shipped_init_json_badge_coercion() {
    let loader = MenuSourceLoader::new();
    let menus_data = loader
        .load(&project_root().join("data/init.json"))
        .unwrap();
    let rows = MenuFlattenerService::new().flatten(&menus_data);

    // 数値バッジは文字列化（0も保持）
    let notifications = rows
        .iter()
        .find(|r| r.id == "top-notifications")
        .unwrap();
    assert_eq!(notifications.badge.as_deref(), Some("0"));

    let cart = rows.iter().find(|r| r.id == "header-cart").unwrap();
    assert_eq!(cart.badge.as_deref(), Some("2"));

    // 文字列バッジはそのまま
    let chat = rows.iter().find(|r| r.id == "chat").unwrap();
    assert_eq!(chat.badge.as_deref(), Some("new"));
}

#[tokio::test]
async fn test_dry_run_against_shipped_assets() {
    let command = MigrateCommand {
        project_path: project_root(),
        config: ConnectionConfig::default(),
        source: None,
        dry_run: true,
        compare: false,
        compare_only: false,
        reset: false,
    };

    let output = MigrateCommandHandler::new()
        .execute(&command)
        .await
        .unwrap();

    // 全ステップが順に含まれる
    for step in [
        "-- 1. CORE SCHEMA",
        "-- 2. CORE SEED",
        "-- 3. CHAT SCHEMA",
        "-- 4. SUPPORT SCHEMA",
        "-- 5. MENUS ALTER",
        "-- 6. MENUS DELETE",
        "-- 7. MENUS INSERT (PARENTS)",
        "-- 8. MENUS INSERT (CHILDREN)",
        "-- 9. MENUS VERIFY",
    ] {
        assert!(output.contains(step), "missing step: {}", step);
    }

    // スキーマファイルの中身がそのまま展開されている
    assert!(output.contains("CREATE TABLE IF NOT EXISTS menus"));
    assert!(output.contains("CREATE TABLE IF NOT EXISTS chat_messages"));
    assert!(output.contains("CREATE TABLE IF NOT EXISTS support_sessions"));

    // 親のINSERTが子のINSERTより先
    let parents_pos = output.find("-- 7. MENUS INSERT (PARENTS)").unwrap();
    let children_pos = output.find("-- 8. MENUS INSERT (CHILDREN)").unwrap();
    assert!(parents_pos < children_pos);

    // resetなしではDROPは現れない
    assert!(!output.contains("DROP TABLE IF EXISTS"));
}

#[tokio::test]
async fn test_dry_run_with_source_override() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("menus.json");
    std::fs::write(
        &source,
        r#"{"menusData": {"menus": {"customer": [{"id": "only", "label": "Only"}]}}}"#,
    )
    .unwrap();

    let command = MigrateCommand {
        project_path: project_root(),
        config: ConnectionConfig::default(),
        source: Some(source.clone()),
        dry_run: true,
        compare: false,
        compare_only: false,
        reset: false,
    };

    let output = MigrateCommandHandler::new()
        .execute(&command)
        .await
        .unwrap();
    assert!(output.contains(&format!("-- Source: {}", source.display())));
    assert!(output.contains("-- Total rows: 1"));
    assert!(output.contains("('only', NULL, 'Only'"));
}

#[test]
fn test_shipped_sql_files_exist() {
    let sql_dir = project_root().join("sql");
    for name in [
        "01_core_schema.sql",
        "02_core_seed.sql",
        "03_chat_schema.sql",
        "04_support_schema.sql",
    ] {
        assert!(
            Path::new(&sql_dir.join(name)).exists(),
            "missing sql file: {}",
            name
        );
    }
}
