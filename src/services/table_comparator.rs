// テーブル比較サービス
//
// 現在のスキーマに存在するベーステーブルと期待テーブルリストの
// 差分を計算します。純粋な読み取り操作で、単独実行(--compare-only)でも
// 適用の前後スナップショット(--compare)でも使われます。

use crate::core::error::DatabaseError;
use crate::services::sql_assembler::EXPECTED_TABLES;
use sqlx::{PgPool, Row};

/// 管理対象とみなす所有権接頭辞
///
/// chat_系テーブルは本ツールが作成・所有する。support_系は別スキーマ
/// バリアントの管理下にあり得るため、意図的にextra分類から除外する。
const MANAGED_PREFIX: &str = "chat_";

/// テーブル差分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    /// 期待しているが存在しない管理テーブル
    pub missing: Vec<String>,
    /// 管理接頭辞を持つが期待リストにないテーブル（旧バージョンの残骸）
    pub extra_managed: Vec<String>,
}

/// テーブル比較サービス
#[derive(Debug, Clone)]
pub struct TableComparatorService {}

impl TableComparatorService {
    /// 新しいTableComparatorServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 現在のスキーマのベーステーブル一覧を取得
    pub async fn fetch_existing_tables(&self, pool: &PgPool) -> Result<Vec<String>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT table_name
             FROM information_schema.tables
             WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'
             ORDER BY table_name;",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| DatabaseError::Query {
            message: format!("Failed to list existing tables: {}", e),
            sql: None,
        })?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("table_name")
                    .map_err(|e| DatabaseError::Query {
                        message: format!("Failed to read table_name column: {}", e),
                        sql: None,
                    })
            })
            .collect()
    }

    /// 期待テーブルリストとの差分を計算（純粋関数）
    pub fn diff(&self, existing: &[String]) -> TableDiff {
        let missing = EXPECTED_TABLES
            .iter()
            .filter(|expected| !existing.iter().any(|t| t == *expected))
            .map(|t| t.to_string())
            .collect();

        let extra_managed = existing
            .iter()
            .filter(|t| t.starts_with(MANAGED_PREFIX))
            .filter(|t| !EXPECTED_TABLES.contains(&t.as_str()))
            .cloned()
            .collect();

        TableDiff {
            missing,
            extra_managed,
        }
    }

    /// 比較結果のレポートをレンダリング
    pub fn format_report(&self, label: &str, existing: &[String], diff: &TableDiff) -> String {
        let mut report = format!("[{}]\n", label);
        report.push_str(&format!("  Existing tables: {}\n", existing.len()));
        report.push_str(&format!("  Missing managed tables: {}\n", diff.missing.len()));
        if !diff.missing.is_empty() {
            report.push_str(&format!("   - {}\n", diff.missing.join("\n   - ")));
        }
        if !diff.extra_managed.is_empty() {
            report.push_str(&format!(
                "  Extra managed tables: {}\n   - {}\n",
                diff.extra_managed.len(),
                diff.extra_managed.join("\n   - ")
            ));
        }
        report
    }
}

impl Default for TableComparatorService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_diff_empty_database_reports_all_missing() {
        let comparator = TableComparatorService::new();
        let diff = comparator.diff(&[]);

        assert_eq!(diff.missing.len(), EXPECTED_TABLES.len());
        assert!(diff.extra_managed.is_empty());
    }

    #[test]
    fn test_diff_complete_database_reports_nothing() {
        let comparator = TableComparatorService::new();
        let existing = tables(EXPECTED_TABLES);
        let diff = comparator.diff(&existing);

        assert!(diff.missing.is_empty());
        assert!(diff.extra_managed.is_empty());
    }

    #[test]
    fn test_diff_flags_orphaned_chat_tables() {
        let comparator = TableComparatorService::new();
        let mut existing = tables(EXPECTED_TABLES);
        existing.push("chat_legacy_drafts".to_string());

        let diff = comparator.diff(&existing);
        assert_eq!(diff.extra_managed, vec!["chat_legacy_drafts"]);
    }

    #[test]
    fn test_diff_ignores_unmanaged_support_tables() {
        // support_系は別スキーマバリアントが所有し得るため、
        // 期待リスト外でもextra扱いしない
        let comparator = TableComparatorService::new();
        let mut existing = tables(EXPECTED_TABLES);
        existing.push("support_legacy_notes".to_string());
        existing.push("completely_unrelated".to_string());

        let diff = comparator.diff(&existing);
        assert!(diff.extra_managed.is_empty());
    }

    #[test]
    fn test_diff_partial_database() {
        let comparator = TableComparatorService::new();
        let existing = tables(&["menus", "app_users", "chat_users"]);
        let diff = comparator.diff(&existing);

        assert!(!diff.missing.contains(&"menus".to_string()));
        assert!(diff.missing.contains(&"roles".to_string()));
        assert!(diff.missing.contains(&"chat_messages".to_string()));
        assert!(diff.extra_managed.is_empty());
    }

    #[test]
    fn test_format_report_lists_missing_tables() {
        let comparator = TableComparatorService::new();
        let existing = tables(&["menus"]);
        let diff = comparator.diff(&existing);
        let report = comparator.format_report("COMPARE Before", &existing, &diff);

        assert!(report.contains("[COMPARE Before]"));
        assert!(report.contains("Existing tables: 1"));
        assert!(report.contains("- roles"));
    }
}
