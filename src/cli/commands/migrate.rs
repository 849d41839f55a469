// migrateコマンドハンドラー
//
// スキーマ/シード/メニュー同期の適用機能を実装します。
// - メニュー定義(init.json)の読み込みとフラット化
// - 実行ステップ列の組み立て
// - dry-run時はSQLダンプのみ（DB接続なし）
// - 適用時は事前条件チェック → 単一トランザクション実行 → 事後条件 → コミット
// - --compare / --compare-only によるテーブル差分レポート

use crate::adapters::database::DatabaseConnectionService;
use crate::core::config::ConnectionConfig;
use crate::core::step::MigrationStep;
use crate::services::menu_flattener::MenuFlattenerService;
use crate::services::menu_source::MenuSourceLoader;
use crate::services::migration_applier::MigrationApplierService;
use crate::services::sql_assembler::SqlAssemblerService;
use crate::services::table_comparator::TableComparatorService;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::path::PathBuf;

/// migrateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct MigrateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 接続設定（スキーマ名検証済み）
    pub config: ConnectionConfig,
    /// メニューソースファイルの上書きパス
    pub source: Option<PathBuf>,
    /// Dry run - 実行せずにSQLを表示
    pub dry_run: bool,
    /// 適用の前後でテーブル差分を表示
    pub compare: bool,
    /// 差分表示のみ（変更なし）
    pub compare_only: bool,
    /// 管理テーブルを先に破壊的削除
    pub reset: bool,
}

impl MigrateCommand {
    /// メニューソースファイルのパスを解決
    pub fn source_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| self.project_path.join("data/init.json"))
    }

    /// 固定SQLファイルディレクトリのパス
    pub fn sql_dir(&self) -> PathBuf {
        self.project_path.join("sql")
    }
}

/// migrateコマンドハンドラー
#[derive(Debug, Clone)]
pub struct MigrateCommandHandler {}

impl MigrateCommandHandler {
    /// 新しいMigrateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// migrateコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は実行結果の概要、失敗時はエラー
    pub async fn execute(&self, command: &MigrateCommand) -> Result<String> {
        // メニュー定義を読み込んでフラット化
        let source_path = command.source_path();
        let loader = MenuSourceLoader::new();
        let menus_data = loader.load(&source_path)?;
        println!("[init.json] loaded: {}", source_path.display());

        let flattener = MenuFlattenerService::new();
        let rows = flattener.flatten(&menus_data);
        let total_rows = rows.len();
        println!("[init.json] parsed {} menu row(s)", total_rows);

        let (parent_rows, child_rows) = flattener.partition(rows);

        // 実行ステップ列を組み立て
        let assembler = SqlAssemblerService::new();
        let steps = assembler.build_steps(
            &command.sql_dir(),
            &parent_rows,
            &child_rows,
            command.reset,
        );

        if command.dry_run {
            // Dry runモード: データベースに接続せずSQLを出力するだけ
            return self.execute_dry_run(command, &source_path, total_rows, &steps);
        }

        // データベース接続を確立
        println!(
            "\nConnecting to {}",
            command.config.display_target()
        );
        let db_service = DatabaseConnectionService::new();
        let pool = db_service
            .connect(&command.config)
            .await
            .with_context(|| "Failed to connect to database")?;
        println!("Connected.\n");

        // 接続はすべての終了経路で必ず閉じる
        let result = self.run_with_connection(&pool, command, &steps).await;
        db_service.close(pool).await;
        result
    }

    /// 接続確立後の実行本体
    async fn run_with_connection(
        &self,
        pool: &PgPool,
        command: &MigrateCommand,
        steps: &[MigrationStep],
    ) -> Result<String> {
        let db_service = DatabaseConnectionService::new();
        db_service
            .prepare_schema(pool, &command.config.schema)
            .await?;
        println!("Using schema: {}\n", command.config.schema);

        let comparator = TableComparatorService::new();

        if command.compare_only {
            // 読み取りのみ。テーブル集合には一切触れない。
            let existing = comparator.fetch_existing_tables(pool).await?;
            let diff = comparator.diff(&existing);
            return Ok(comparator.format_report("COMPARE-ONLY", &existing, &diff));
        }

        if command.compare {
            let existing = comparator.fetch_existing_tables(pool).await?;
            let diff = comparator.diff(&existing);
            println!("{}", comparator.format_report("COMPARE Before", &existing, &diff));
        }

        let applier = MigrationApplierService::new();

        // resetは既存構造を破棄するため、互換性チェックは意味を持たない
        if !command.reset {
            applier.assert_compatible_existing_tables(pool).await?;
        }

        applier.apply(pool, steps).await?;

        let mut summary = String::from("Migration completed successfully!");

        if command.compare {
            let existing = comparator.fetch_existing_tables(pool).await?;
            let diff = comparator.diff(&existing);
            summary.push_str("\n\n");
            summary.push_str(&comparator.format_report("COMPARE After", &existing, &diff));
        }

        Ok(summary)
    }

    /// Dry runモードの実行
    fn execute_dry_run(
        &self,
        command: &MigrateCommand,
        source_path: &std::path::Path,
        total_rows: usize,
        steps: &[MigrationStep],
    ) -> Result<String> {
        let mut output = String::from("-- ============================\n");
        output.push_str("-- DRY RUN (SQL output only)\n");
        output.push_str(&format!("-- Source: {}\n", source_path.display()));
        output.push_str(&format!("-- Target: {}\n", command.config.display_target()));
        output.push_str(&format!("-- Schema: {}\n", command.config.schema));
        output.push_str(&format!("-- Total rows: {}\n", total_rows));
        output.push_str(&format!("-- Compare: {}\n", command.compare));
        output.push_str(&format!("-- Compare-only: {}\n", command.compare_only));
        output.push_str(&format!("-- Reset: {}\n", command.reset));
        if command.compare {
            output.push_str(
                "-- NOTE: dry-run never contacts the database, so compare output is skipped.\n",
            );
        }
        output.push_str("-- ============================\n\n");

        for step in steps {
            output.push_str(&format!("-- {}\n", step.name));
            output.push_str(&step.resolve_sql()?);
            output.push_str("\n\n");
        }

        Ok(output)
    }
}

impl Default for MigrateCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
