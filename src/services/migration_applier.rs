// トランザクション適用サービス
//
// 実行ステップ列を単一トランザクション内で順次適用します。
// 実行フロー: 事前条件チェック → 全ステップ実行 → 事後条件チェック → コミット。
// いずれかの失敗で残りのステップは中止し、ベストエフォートの
// ロールバックを発行して元のエラーを返します。部分適用は永続化されません。

use crate::core::error::ApplyError;
use crate::core::step::MigrationStep;
use anyhow::{Context, Result};
use colored::Colorize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

/// 事前条件: 既存テーブルが存在する場合に要求するカラム
///
/// テーブルが未作成ならこの段階ではエラーにしない（スキーマステップが
/// 作成する）。存在するのにカラムが欠けている場合は、スキーマSQLが
/// 途中で失敗し得るため、変更前に中止して対処方法を案内する。
const PRECHECK_TABLES: &[(&str, &[&str])] = &[
    ("app_users", &["id", "username", "password", "email", "role_id"]),
    ("menus", &["id", "label", "order_seq", "show_in_drawer"]),
];

/// 事後条件: 全ステップ実行後にmenusテーブルへ存在すべきカラム
const POSTCHECK_MENU_COLUMNS: &[&str] = &["menu_type", "is_public", "badge", "action"];

/// トランザクション適用サービス
#[derive(Debug, Clone)]
pub struct MigrationApplierService {}

impl MigrationApplierService {
    /// 新しいMigrationApplierServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 既存テーブルの構造互換性を検証（事前条件）
    ///
    /// --reset時はスキップされます（既存構造は破棄されるため）。
    pub async fn assert_compatible_existing_tables(&self, pool: &PgPool) -> Result<()> {
        for (table, required) in PRECHECK_TABLES {
            let columns = self.table_columns(pool, table).await?;
            if columns.is_empty() {
                // テーブル未作成はこの段階ではエラーにしない
                continue;
            }

            let missing: Vec<String> = required
                .iter()
                .filter(|c| !columns.iter().any(|col| col == *c))
                .map(|c| c.to_string())
                .collect();

            if !missing.is_empty() {
                return Err(ApplyError::IncompatibleTable {
                    table: table.to_string(),
                    missing_columns: missing,
                }
                .into());
            }
        }
        Ok(())
    }

    /// 全ステップを単一トランザクション内で適用
    ///
    /// 事後条件チェックもトランザクション内（コミット前）で行います。
    /// ロールバックの失敗は警告して握りつぶし、元のエラーを返します。
    pub async fn apply(&self, pool: &PgPool, steps: &[MigrationStep]) -> Result<()> {
        let mut tx = pool
            .begin()
            .await
            .with_context(|| "Failed to start transaction")?;

        let result = self.run_steps(&mut tx, steps).await;

        match result {
            Ok(()) => {
                tx.commit()
                    .await
                    .with_context(|| "Failed to commit transaction")?;
                Ok(())
            }
            Err(e) => {
                // ベストエフォート: ロールバック失敗で元のエラーを隠さない
                if let Err(rollback_err) = tx.rollback().await {
                    eprintln!("Warning: rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// ステップを順次実行し、最後に事後条件を検証
    async fn run_steps(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        steps: &[MigrationStep],
    ) -> Result<()> {
        for step in steps {
            println!("{}...", step.name);
            let sql = step.resolve_sql()?;

            if step.is_query {
                let rows = sqlx::query(&sql)
                    .fetch_all(&mut **tx)
                    .await
                    .with_context(|| format!("Step failed: {}", step.name))?;
                print!("{}", self.render_menu_counts(&rows)?);
            } else {
                // ステップは複数文を含み得るため、simple queryプロトコルで実行
                sqlx::raw_sql(&sql)
                    .execute(&mut **tx)
                    .await
                    .with_context(|| format!("Step failed: {}", step.name))?;
                println!("  {}", "OK".green());
            }
        }

        self.verify_menu_columns(tx).await
    }

    /// menusテーブルに期待カラムが揃ったことを検証（事後条件）
    async fn verify_menu_columns(&self, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
        let columns = self.table_columns(&mut **tx, "menus").await?;

        let missing: Vec<String> = POSTCHECK_MENU_COLUMNS
            .iter()
            .filter(|c| !columns.iter().any(|col| col == *c))
            .map(|c| c.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ApplyError::PostconditionFailed {
                table: "menus".to_string(),
                missing_columns: missing,
            }
            .into());
        }
        Ok(())
    }

    /// テーブルのカラム名一覧を取得（存在しなければ空）
    async fn table_columns<'e, E>(&self, executor: E, table: &str) -> Result<Vec<String>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query(
            "SELECT column_name
             FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = $1
             ORDER BY ordinal_position;",
        )
        .bind(table)
        .fetch_all(executor)
        .await
        .with_context(|| format!("Failed to read columns of table '{}'", table))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("column_name")
                    .with_context(|| "Failed to read column_name")
            })
            .collect()
    }

    /// 検証クエリ結果をmenu_type別件数表としてレンダリング
    fn render_menu_counts(&self, rows: &[PgRow]) -> Result<String> {
        let mut output = String::from("\n  menu_type  | count\n  -----------+------\n");
        for row in rows {
            let menu_type: Option<String> = row
                .try_get("menu_type")
                .with_context(|| "Failed to read menu_type")?;
            let count: i64 = row
                .try_get("cnt")
                .with_context(|| "Failed to read cnt")?;
            output.push_str(&format!(
                "  {:<10} | {}\n",
                menu_type.as_deref().unwrap_or("sidebar"),
                count
            ));
        }
        output.push('\n');
        Ok(output)
    }
}

impl Default for MigrationApplierService {
    fn default() -> Self {
        Self::new()
    }
}
