// SQL値レンダリングユーティリティ
//
// 生成SQLに埋め込む値のリテラル表現を提供します。
// メニュー定義は信頼できるローカルファイル由来ですが、ラベルやパスに
// 引用符が含まれても文が壊れないことを保証します。

use std::fmt;

/// 生成SQLに埋め込む値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// NULLリテラル
    Null,
    /// 真偽値（クォートなし）
    Bool(bool),
    /// 整数（クォートなし）
    Int(i64),
    /// テキスト（シングルクォート、内部の引用符は二重化）
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => SqlValue::Text(s),
            None => SqlValue::Null,
        }
    }
}

impl From<Option<&str>> for SqlValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => SqlValue::Text(s.to_string()),
            None => SqlValue::Null,
        }
    }
}

/// 値をSQLリテラルへレンダリング
///
/// # Examples
/// ```
/// use groundwork::adapters::sql_value::{escape, SqlValue};
/// assert_eq!(escape(SqlValue::from("O'Brien")), "'O''Brien'");
/// assert_eq!(escape(SqlValue::Null), "NULL");
/// assert_eq!(escape(SqlValue::from(true)), "true");
/// assert_eq!(escape(SqlValue::from(42i64)), "42");
/// ```
pub fn escape(value: SqlValue) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_renders_bare_token() {
        assert_eq!(escape(SqlValue::Null), "NULL");
        assert_eq!(escape(SqlValue::from(None::<String>)), "NULL");
    }

    #[test]
    fn test_booleans_render_unquoted() {
        assert_eq!(escape(SqlValue::from(true)), "true");
        assert_eq!(escape(SqlValue::from(false)), "false");
    }

    #[test]
    fn test_numbers_render_unquoted() {
        assert_eq!(escape(SqlValue::from(42i64)), "42");
        assert_eq!(escape(SqlValue::from(0i64)), "0");
        assert_eq!(escape(SqlValue::from(-7i64)), "-7");
        assert_eq!(escape(SqlValue::from(3u32)), "3");
    }

    #[test]
    fn test_text_is_single_quoted() {
        assert_eq!(escape(SqlValue::from("dashboard")), "'dashboard'");
        assert_eq!(escape(SqlValue::from("")), "''");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(escape(SqlValue::from("O'Brien")), "'O''Brien'");
        assert_eq!(escape(SqlValue::from("it's a 'test'")), "'it''s a ''test'''");
        assert_eq!(escape(SqlValue::from("'")), "''''");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(
            escape(SqlValue::from(Some("badge".to_string()))),
            "'badge'"
        );
        assert_eq!(escape(SqlValue::from(None::<&str>)), "NULL");
    }
}
