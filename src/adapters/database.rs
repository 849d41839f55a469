// データベース接続アダプター
//
// SQLxを使用したPostgreSQL接続の管理を行います。
// search_pathはセッション状態なので、プールは単一接続に固定します。
// 1回の実行につき1接続・1トランザクションで、プーリングやリトライは
// 行いません。

use crate::core::config::ConnectionConfig;
use crate::core::error::DatabaseError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// データベース接続サービス
///
/// 接続の確立、対象スキーマの準備、切断を担当します。
#[derive(Debug, Clone)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// データベース接続を作成
    ///
    /// SET search_pathが接続をまたいで失われないよう、
    /// 最大接続数1のプールとして保持します。
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = config.connection_string();

        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("Failed to connect to {}", config.display_target()),
                cause: e.to_string(),
            })
    }

    /// 対象スキーマを準備
    ///
    /// public以外のスキーマが指定された場合は作成し、
    /// セッションのsearch_pathを対象スキーマへ切り替えます。
    /// スキーマ名はConnectionConfig::validateで検証済みであること。
    pub async fn prepare_schema(
        &self,
        pool: &PgPool,
        schema: &str,
    ) -> Result<(), DatabaseError> {
        if schema != "public" {
            let create_sql = format!("CREATE SCHEMA IF NOT EXISTS {};", schema);
            sqlx::query(&create_sql)
                .execute(pool)
                .await
                .map_err(|e| DatabaseError::Query {
                    message: format!("Failed to create schema '{}': {}", schema, e),
                    sql: Some(create_sql.clone()),
                })?;
        }

        let set_sql = format!("SET search_path TO {};", schema);
        sqlx::query(&set_sql)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Query {
                message: format!("Failed to set search_path to '{}': {}", schema, e),
                sql: Some(set_sql),
            })?;

        Ok(())
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, pool: &PgPool) -> Result<(), DatabaseError> {
        // シンプルなクエリで接続をテスト
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "Connection test failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// 接続を閉じる
    ///
    /// 正常・異常どちらの終了経路でも必ず呼び出されます。
    pub async fn close(&self, pool: PgPool) {
        pool.close().await;
    }
}

impl Default for DatabaseConnectionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_service() {
        let service = DatabaseConnectionService::new();
        assert!(format!("{:?}", service).contains("DatabaseConnectionService"));
    }

    #[test]
    fn test_connection_string_round_trip() {
        let config = ConnectionConfig {
            host: "db.example.com".to_string(),
            port: 5433,
            database: "appdb".to_string(),
            user: "svc".to_string(),
            password: "secret".to_string(),
            schema: "public".to_string(),
        };

        let conn_str = config.connection_string();
        assert!(conn_str.starts_with("postgresql://"));
        assert!(conn_str.contains("svc:secret"));
        assert!(conn_str.contains("db.example.com"));
        assert!(conn_str.contains("5433"));
        assert!(conn_str.contains("appdb"));
    }
}
