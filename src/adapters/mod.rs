// アダプター層
// データベース接続と生成SQLの値レンダリング

pub mod database;
pub mod sql_value;
