// SQL組み立てサービス
//
// 実行ステップ列を組み立てます:
// 0. RESET（--reset時のみ、管理テーブルの破壊的削除）
// 1-4. 固定スキーマ/シードファイル（ディスクから読み込み、そのまま実行）
// 5-9. メニュー同期の生成SQL（ALTER → DELETE → INSERT親 → INSERT子 → VERIFY）
//
// メニュー行はDELETEしてから挿入し直すため、再実行しても行集合レベルで
// 冪等です（ON CONFLICT DO NOTHINGは同一実行内の重複IDを無視するだけ）。

use crate::adapters::sql_value::SqlValue;
use crate::core::menu::MenuRow;
use crate::core::step::MigrationStep;
use std::path::Path;

/// 本ツールが所有者とみなす管理テーブル（期待テーブルリスト）
pub const EXPECTED_TABLES: &[&str] = &[
    // フレームワークコア
    "roles",
    "permissions",
    "role_permissions",
    "app_users",
    "menus",
    "common_codes",
    "products",
    "cart_items",
    "orders",
    "order_items",
    // チャット
    "chat_users",
    "chat_channels",
    "chat_subscriptions",
    "chat_topics",
    "chat_messages",
    "chat_reactions",
    "chat_attachments",
    // サポート
    "support_sessions",
    "support_reviews",
    "support_customer_info",
    "support_templates",
    "support_coupons",
];

/// menusテーブルのINSERTカラムリスト
const INSERT_COLS_MENU: &str = "(id, parent_id, label, icon, path, order_seq, is_parent, \
                                show_in_drawer, menu_type, is_public, badge, action)";

/// menusテーブルへの列追加（既に存在すれば無視）とインデックス作成
const SQL_ALTER_MENUS: &str = r#"
-- 列追加（既に存在すれば無視）
DO $$
BEGIN
  IF NOT EXISTS (SELECT 1 FROM information_schema.columns WHERE table_schema=current_schema() AND table_name='menus' AND column_name='menu_type')
  THEN ALTER TABLE menus ADD COLUMN menu_type VARCHAR(20) DEFAULT NULL; END IF;
  IF NOT EXISTS (SELECT 1 FROM information_schema.columns WHERE table_schema=current_schema() AND table_name='menus' AND column_name='is_public')
  THEN ALTER TABLE menus ADD COLUMN is_public BOOLEAN DEFAULT true; END IF;
  IF NOT EXISTS (SELECT 1 FROM information_schema.columns WHERE table_schema=current_schema() AND table_name='menus' AND column_name='badge')
  THEN ALTER TABLE menus ADD COLUMN badge VARCHAR(20); END IF;
  IF NOT EXISTS (SELECT 1 FROM information_schema.columns WHERE table_schema=current_schema() AND table_name='menus' AND column_name='action')
  THEN ALTER TABLE menus ADD COLUMN action VARCHAR(20) DEFAULT NULL; END IF;
END $$;
CREATE INDEX IF NOT EXISTS idx_menus_menu_type ON menus(menu_type);
"#;

/// メニュー行の全削除（子→親の順）
const SQL_DELETE_MENUS: &str = "\
DELETE FROM menus WHERE parent_id IS NOT NULL;
DELETE FROM menus WHERE parent_id IS NULL;
";

/// メニュー種別ごとの件数を報告する検証クエリ
const SQL_VERIFY_MENUS: &str =
    "SELECT menu_type, COUNT(*) as cnt FROM menus GROUP BY menu_type ORDER BY menu_type NULLS FIRST;";

/// SQL組み立てサービス
#[derive(Debug, Clone)]
pub struct SqlAssemblerService {}

impl SqlAssemblerService {
    /// 新しいSqlAssemblerServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 実行ステップ列を組み立てる
    ///
    /// # Arguments
    ///
    /// * `sql_dir` - 固定SQLファイルのディレクトリ
    /// * `parent_rows` - ルートメニュー行（先に挿入）
    /// * `child_rows` - 子メニュー行（後に挿入）
    /// * `reset` - 管理テーブルの破壊的削除を先頭に追加するか
    pub fn build_steps(
        &self,
        sql_dir: &Path,
        parent_rows: &[MenuRow],
        child_rows: &[MenuRow],
        reset: bool,
    ) -> Vec<MigrationStep> {
        let mut steps = Vec::new();

        if reset {
            steps.push(MigrationStep::generated(
                "0. RESET (DROP TABLES)",
                self.reset_sql(),
            ));
        }

        steps.push(MigrationStep::from_file(
            "1. CORE SCHEMA",
            sql_dir.join("01_core_schema.sql"),
        ));
        steps.push(MigrationStep::from_file(
            "2. CORE SEED",
            sql_dir.join("02_core_seed.sql"),
        ));
        steps.push(MigrationStep::from_file(
            "3. CHAT SCHEMA",
            sql_dir.join("03_chat_schema.sql"),
        ));
        steps.push(MigrationStep::from_file(
            "4. SUPPORT SCHEMA",
            sql_dir.join("04_support_schema.sql"),
        ));

        steps.push(MigrationStep::generated("5. MENUS ALTER", SQL_ALTER_MENUS));
        steps.push(MigrationStep::generated("6. MENUS DELETE", SQL_DELETE_MENUS));
        steps.push(MigrationStep::generated(
            "7. MENUS INSERT (PARENTS)",
            self.build_menu_insert(parent_rows, "-- (no parent menu rows)"),
        ));
        steps.push(MigrationStep::generated(
            "8. MENUS INSERT (CHILDREN)",
            self.build_menu_insert(child_rows, "-- (no child menu rows)"),
        ));
        steps.push(MigrationStep::query("9. MENUS VERIFY", SQL_VERIFY_MENUS));

        steps
    }

    /// メニュー行のバルクINSERT文を生成
    ///
    /// 行がない場合はコメントのみの文を返します（実行しても無害）。
    pub fn build_menu_insert(&self, rows: &[MenuRow], empty_comment: &str) -> String {
        if rows.is_empty() {
            return empty_comment.to_string();
        }

        let values: Vec<String> = rows.iter().map(|row| self.render_menu_row(row)).collect();
        format!(
            "INSERT INTO menus {} VALUES\n{}\nON CONFLICT (id) DO NOTHING;",
            INSERT_COLS_MENU,
            values.join(",\n")
        )
    }

    /// メニュー1行分のVALUESタプルをレンダリング
    fn render_menu_row(&self, row: &MenuRow) -> String {
        format!(
            "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
            SqlValue::from(row.id.as_str()),
            SqlValue::from(row.parent_id.as_deref()),
            SqlValue::from(row.label.as_str()),
            SqlValue::from(row.icon.as_deref()),
            SqlValue::from(row.path.as_deref()),
            SqlValue::from(row.order_seq),
            SqlValue::from(row.is_parent),
            SqlValue::from(row.show_in_drawer),
            SqlValue::from(row.menu_type.tag()),
            SqlValue::from(row.is_public),
            SqlValue::from(row.badge.as_deref()),
            SqlValue::from(row.action.as_deref()),
        )
    }

    /// 管理テーブルの破壊的削除SQL
    ///
    /// 依存先から先に並べるが、CASCADE指定なので順序は保険にすぎない。
    pub fn reset_sql(&self) -> String {
        let tables = [
            "order_items",
            "orders",
            "cart_items",
            "products",
            "common_codes",
            "role_permissions",
            "permissions",
            "roles",
            "menus",
            "app_users",
            "support_coupons",
            "support_templates",
            "support_customer_info",
            "support_reviews",
            "support_sessions",
            "chat_attachments",
            "chat_reactions",
            "chat_messages",
            "chat_topics",
            "chat_subscriptions",
            "chat_channels",
            "chat_users",
        ];
        format!(
            "-- Drop managed tables (DANGER)\nDROP TABLE IF EXISTS\n  {}\nCASCADE;",
            tables.join(",\n  ")
        )
    }
}

impl Default for SqlAssemblerService {
    fn default() -> Self {
        Self::new()
    }
}
