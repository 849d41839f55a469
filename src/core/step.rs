// 実行ステップモデル
//
// 1回の実行で適用する名前付きSQLステップの定義。
// ステップ列は実行ごとに一度だけ組み立てられ、実行中は不変です。

use crate::core::error::SourceError;
use std::fs;
use std::path::PathBuf;

/// ステップのSQLソース
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSource {
    /// ディスク上の固定SQLファイル（そのまま実行、パースしない）
    File(PathBuf),
    /// 実行時に生成したSQLテキスト
    Generated(String),
}

/// マイグレーションステップ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// 表示用ステップ名
    pub name: String,
    /// SQLソース
    pub source: StepSource,
    /// 結果行を報告するクエリステップかどうか
    pub is_query: bool,
}

impl MigrationStep {
    /// 生成SQLのステップを作成
    pub fn generated(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: StepSource::Generated(sql.into()),
            is_query: false,
        }
    }

    /// ファイルベースのステップを作成
    pub fn from_file(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            source: StepSource::File(path),
            is_query: false,
        }
    }

    /// クエリステップ（結果行を報告する）を作成
    pub fn query(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: StepSource::Generated(sql.into()),
            is_query: true,
        }
    }

    /// ステップのSQLテキストを解決
    ///
    /// ファイルベースのステップはここで読み込みます。読めない場合は
    /// SourceError（DB接続前に致命的）になります。
    pub fn resolve_sql(&self) -> Result<String, SourceError> {
        match &self.source {
            StepSource::Generated(sql) => Ok(sql.clone()),
            StepSource::File(path) => {
                fs::read_to_string(path).map_err(|e| SourceError::FileRead {
                    path: path.display().to_string(),
                    cause: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_generated_step_resolves_inline_sql() {
        let step = MigrationStep::generated("MENUS DELETE", "DELETE FROM menus;");
        assert!(!step.is_query);
        assert_eq!(step.resolve_sql().unwrap(), "DELETE FROM menus;");
    }

    #[test]
    fn test_query_step_is_flagged() {
        let step = MigrationStep::query("MENUS VERIFY", "SELECT 1;");
        assert!(step.is_query);
    }

    #[test]
    fn test_file_step_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "CREATE TABLE t (id INT);").unwrap();

        let step = MigrationStep::from_file("CORE SCHEMA", file.path().to_path_buf());
        assert_eq!(step.resolve_sql().unwrap(), "CREATE TABLE t (id INT);");
    }

    #[test]
    fn test_file_step_missing_file_is_source_error() {
        let step = MigrationStep::from_file(
            "CORE SCHEMA",
            PathBuf::from("/nonexistent/groundwork/schema.sql"),
        );
        let err = step.resolve_sql().unwrap_err();
        assert!(err.is_file_read());
        assert!(err.to_string().contains("/nonexistent/groundwork/schema.sql"));
    }
}
