// seed-usersコマンドハンドラー
//
// 組み込みの初期アカウント（admin/user）の投入機能を実装します。
// - パスワードをbcryptでハッシュ化（検証器互換タグ付き）
// - 必須テーブル（users / user_authorities）の存在チェック
// - 単一トランザクションでUPSERTと権限同期
// - 投入結果の検証レポートとログイン情報の表示

use crate::adapters::database::DatabaseConnectionService;
use crate::core::config::ConnectionConfig;
use crate::core::user::{builtin_users, HashedUser};
use crate::services::user_provisioner::UserProvisionerService;
use anyhow::{Context, Result};
use sqlx::PgPool;

/// seed-usersコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct SeedUsersCommand {
    /// 接続設定（スキーマ名検証済み）
    pub config: ConnectionConfig,
    /// Dry run - 実行せずに計画を表示
    pub dry_run: bool,
}

/// seed-usersコマンドハンドラー
#[derive(Debug, Clone)]
pub struct SeedUsersCommandHandler {}

impl SeedUsersCommandHandler {
    /// 新しいSeedUsersCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// seed-usersコマンドを実行
    pub async fn execute(&self, command: &SeedUsersCommand) -> Result<String> {
        let provisioner = UserProvisionerService::new();

        // ハッシュ化はDB接続より先。失敗すれば何も書き込まない。
        println!("Hashing built-in account passwords (bcrypt)...");
        let users = provisioner.hash_users(builtin_users())?;
        for user in &users {
            println!(
                "  {}: {} -> {}...",
                user.record.user_id,
                user.record.password,
                hash_preview(user)
            );
        }

        if command.dry_run {
            return Ok(self.render_dry_run(command, &users));
        }

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

        let result = self.run_with_connection(&pool, command, &users).await;
        db_service.close(pool).await;
        result
    }

    /// 接続確立後の実行本体
    async fn run_with_connection(
        &self,
        pool: &PgPool,
        command: &SeedUsersCommand,
        users: &[HashedUser],
    ) -> Result<String> {
        let db_service = DatabaseConnectionService::new();
        db_service
            .prepare_schema(pool, &command.config.schema)
            .await?;
        println!("Using schema: {}\n", command.config.schema);

        let provisioner = UserProvisionerService::new();
        provisioner.assert_required_tables(pool).await?;

        println!("Provisioning {} account(s)...", users.len());
        provisioner.provision(pool, users).await?;

        let report = provisioner.verify(pool).await?;

        let mut summary = String::from("User seeding completed successfully!");
        summary.push('\n');
        summary.push_str(&report);
        summary.push_str(&login_info(users));
        Ok(summary)
    }

    /// Dry runの計画サマリーを生成
    fn render_dry_run(&self, command: &SeedUsersCommand, users: &[HashedUser]) -> String {
        let mut output = String::from("-- ============================\n");
        output.push_str("-- DRY RUN (no database contact)\n");
        output.push_str(&format!("-- Target: {}\n", command.config.display_target()));
        output.push_str(&format!("-- Schema: {}\n", command.config.schema));
        output.push_str("-- ============================\n\n");
        output.push_str("Planned steps:\n");
        output.push_str("  1. Verify required tables exist: users, user_authorities\n");
        output.push_str("  2. BEGIN transaction\n");
        for (index, user) in users.iter().enumerate() {
            output.push_str(&format!(
                "  {}. Upsert user '{}' ({}) and sync authorities [{}]\n",
                index + 3,
                user.record.user_id,
                user.record.email,
                user.record.authorities_csv()
            ));
        }
        output.push_str(&format!("  {}. COMMIT\n", users.len() + 3));
        output.push_str(&login_info(users));
        output
    }
}

impl Default for SeedUsersCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// ハッシュの先頭部分のみを表示用に切り出す
///
/// 完全なハッシュはログに残しません。
fn hash_preview(user: &HashedUser) -> &str {
    let end = user.hashed_password.len().min(20);
    &user.hashed_password[..end]
}

/// ログイン情報サマリー
fn login_info(users: &[HashedUser]) -> String {
    let mut output = String::from("\nLogin info:\n");
    for user in users {
        output.push_str(&format!(
            "  {} / {} ({})\n",
            user.record.user_id,
            user.record.password,
            user.record.authorities.join(", ")
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashed_builtin_users() -> Vec<HashedUser> {
        UserProvisionerService::new()
            .hash_users(builtin_users())
            .unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_lists_both_accounts_and_commit() {
        let command = SeedUsersCommand {
            config: ConnectionConfig::default(),
            dry_run: true,
        };

        let output = SeedUsersCommandHandler::new()
            .execute(&command)
            .await
            .unwrap();

        assert!(output.contains("-- DRY RUN"));
        assert!(output.contains("Upsert user 'admin'"));
        assert!(output.contains("Upsert user 'user'"));
        assert!(output.contains("ROLE_ADMIN,ROLE_USER"));
        assert!(output.contains("5. COMMIT"));
    }

    #[tokio::test]
    async fn test_dry_run_shows_login_info() {
        let command = SeedUsersCommand {
            config: ConnectionConfig::default(),
            dry_run: true,
        };

        let output = SeedUsersCommandHandler::new()
            .execute(&command)
            .await
            .unwrap();

        assert!(output.contains("Login info:"));
        assert!(output.contains("admin / admin1234! (ROLE_ADMIN, ROLE_USER)"));
        assert!(output.contains("user / user1234! (ROLE_USER)"));
    }

    #[test]
    fn test_hash_preview_never_exceeds_20_chars() {
        for user in hashed_builtin_users() {
            assert!(hash_preview(&user).len() <= 20);
            assert!(hash_preview(&user).starts_with("$2a$10$"));
        }
    }
}
