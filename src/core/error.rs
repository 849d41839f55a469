// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ConfigError, SourceError, DatabaseError, ApplyError を定義します。
//
// エラー分類:
// - ConfigError: CLI設定の検証エラー（DB接続前、副作用なし）
// - SourceError: 入力ファイルの読み込み・解析エラー（DB接続前）
// - DatabaseError: 接続・クエリ・トランザクションの失敗
// - ApplyError: 事前条件・事後条件の違反（ロールバックを伴う）

use thiserror::Error;

/// 設定エラー
///
/// CLIフラグから構築した設定の検証時に発生するエラーを表現します。
/// どのエラーもデータベース接続前に発生し、副作用はありません。
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// スキーマ名が識別子パターンに一致しない
    ///
    /// スキーマ名は `CREATE SCHEMA` / `SET search_path` にエスケープなしで
    /// 埋め込まれるため、SQL組み立て前に必ず検証します。
    #[error("Invalid schema name: '{name}'. Schema names must match ^[A-Za-z_][A-Za-z0-9_]*$")]
    UnsafeSchemaName {
        /// 指定されたスキーマ名
        name: String,
    },
}

/// 入力ソースエラー
///
/// メニュー定義ファイル(init.json)や固定SQLファイルの読み込み時に
/// 発生するエラーを表現します。すべてデータベース接続前に発生します。
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source file could not be read
    #[error("Failed to read source file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Source file is not valid JSON
    #[error("Failed to parse source file: {path} (cause: {cause})")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Required field is absent from the document
    #[error("Source file {path} does not contain required field '{field}'")]
    MissingField {
        /// ファイルパス
        path: String,
        /// 欠落フィールド名
        field: String,
    },
}

impl SourceError {
    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, SourceError::FileRead { .. })
    }

    /// パースエラーかどうか
    pub fn is_parse(&self) -> bool {
        matches!(self, SourceError::Parse { .. })
    }

    /// 必須フィールド欠落エラーかどうか
    pub fn is_missing_field(&self) -> bool {
        matches!(self, SourceError::MissingField { .. })
    }
}

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction {
        /// エラーメッセージ
        message: String,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// トランザクションエラーかどうか
    pub fn is_transaction(&self) -> bool {
        matches!(self, DatabaseError::Transaction { .. })
    }
}

/// 適用エラー
///
/// マイグレーション適用の事前条件・事後条件チェックで発生する
/// エラーを表現します。どちらもトランザクション全体のロールバックを
/// 引き起こします（事後条件はコミット前に検査する契約）。
#[derive(Debug, Clone, Error)]
pub enum ApplyError {
    /// Existing table is structurally incompatible with the managed schema
    #[error(
        "Existing table \"{table}\" is incompatible with the managed schema.\n\
         Missing columns: {}\n\
         Action: run with --reset to drop managed tables, or use a dedicated database/schema.",
        missing_columns.join(", ")
    )]
    IncompatibleTable {
        /// テーブル名
        table: String,
        /// 欠落カラム名
        missing_columns: Vec<String>,
    },

    /// Required table does not exist
    #[error(
        "Required table(s) missing: {}\n{remedy}",
        tables.join(", ")
    )]
    MissingTable {
        /// 欠落テーブル名
        tables: Vec<String>,
        /// 対処方法の説明
        remedy: String,
    },

    /// Expected columns still absent after all steps ran
    #[error(
        "Table \"{table}\" is missing expected column(s) after apply: {}",
        missing_columns.join(", ")
    )]
    PostconditionFailed {
        /// テーブル名
        table: String,
        /// 欠落カラム名
        missing_columns: Vec<String>,
    },
}

impl ApplyError {
    /// 事前条件エラーかどうか
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ApplyError::IncompatibleTable { .. } | ApplyError::MissingTable { .. }
        )
    }

    /// 事後条件エラーかどうか
    pub fn is_postcondition(&self) -> bool {
        matches!(self, ApplyError::PostconditionFailed { .. })
    }
}
