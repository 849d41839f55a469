// 初期アカウント投入サービス
//
// 組み込みユーザーリストをハッシュ化し、認証スキーマの
// users / user_authorities テーブルへ単一トランザクションで投入します。
// - usersはuser_id主キーでUPSERT（既存なら全可変フィールドを上書き）
// - user_authoritiesは全削除→再挿入で完全同期
//
// ハッシュは外部検証器（Spring SecurityのBCryptPasswordEncoder）が
// 期待する$2a$タグと互換である必要があります。bcryptのネイティブ出力は
// $2b$ですがアルゴリズムは同一のため、ハッシュ後にタグだけ書き換えます。

use crate::core::error::ApplyError;
use crate::core::user::{HashedUser, UserRecord};
use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Row, Transaction};

/// Spring SecurityのBCryptPasswordEncoderデフォルトと揃えたコスト
const BCRYPT_COST: u32 = 10;

/// 投入先に必須のテーブル
const REQUIRED_TABLES: &[&str] = &["users", "user_authorities"];

/// 初期アカウント投入サービス
#[derive(Debug, Clone)]
pub struct UserProvisionerService {}

impl UserProvisionerService {
    /// 新しいUserProvisionerServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 全ユーザーのパスワードをハッシュ化
    pub fn hash_users(&self, users: Vec<UserRecord>) -> Result<Vec<HashedUser>> {
        users
            .into_iter()
            .map(|record| {
                let hashed = bcrypt::hash(record.password, BCRYPT_COST)
                    .with_context(|| format!("Failed to hash password for '{}'", record.user_id))?;
                Ok(HashedUser {
                    record,
                    hashed_password: spring_compatible_tag(hashed),
                })
            })
            .collect()
    }

    /// 必須テーブルの存在を検証
    ///
    /// どちらかが欠けていれば書き込み前に中止します。
    pub async fn assert_required_tables(&self, pool: &PgPool) -> Result<()> {
        let rows = sqlx::query(
            "SELECT table_name
             FROM information_schema.tables
             WHERE table_schema = current_schema()
               AND table_name IN ('users', 'user_authorities')
             ORDER BY table_name;",
        )
        .fetch_all(pool)
        .await
        .with_context(|| "Failed to check required tables")?;

        let existing: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<_, _>>()
            .with_context(|| "Failed to read table_name column")?;

        let missing: Vec<String> = REQUIRED_TABLES
            .iter()
            .filter(|t| !existing.iter().any(|e| e == *t))
            .map(|t| t.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ApplyError::MissingTable {
                tables: missing,
                remedy: "Ensure the authentication module schema has been created \
                         (e.g. start/initialize the auth module first)."
                    .to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 全ユーザーを単一トランザクションで投入
    pub async fn provision(&self, pool: &PgPool, users: &[HashedUser]) -> Result<()> {
        let mut tx = pool
            .begin()
            .await
            .with_context(|| "Failed to start transaction")?;

        let result = self.provision_all(&mut tx, users).await;

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

    async fn provision_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        users: &[HashedUser],
    ) -> Result<()> {
        for user in users {
            self.upsert_user(tx, user).await?;
            self.sync_authorities(tx, user).await?;
            println!("  OK: {}", user.record.user_id);
        }
        Ok(())
    }

    /// ユーザーをuser_id主キーでUPSERT
    async fn upsert_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &HashedUser,
    ) -> Result<()> {
        let now = chrono::Utc::now().naive_utc();
        let record = &user.record;

        sqlx::query(
            "INSERT INTO users (
                user_id, user_name, user_real_name, email, phone, password,
                authorities, enabled, account_non_expired, account_non_locked,
                credentials_non_expired, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (user_id) DO UPDATE SET
                user_name = EXCLUDED.user_name,
                user_real_name = EXCLUDED.user_real_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                password = EXCLUDED.password,
                authorities = EXCLUDED.authorities,
                enabled = EXCLUDED.enabled,
                account_non_expired = EXCLUDED.account_non_expired,
                account_non_locked = EXCLUDED.account_non_locked,
                credentials_non_expired = EXCLUDED.credentials_non_expired,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(record.user_id)
        .bind(record.user_name)
        .bind(record.user_real_name)
        .bind(record.email)
        .bind(record.phone)
        .bind(&user.hashed_password)
        .bind(record.authorities_csv())
        .bind(record.enabled)
        .bind(record.account_non_expired)
        .bind(record.account_non_locked)
        .bind(record.credentials_non_expired)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to upsert user '{}'", record.user_id))?;

        Ok(())
    }

    /// 権限テーブルを完全同期（全削除→再挿入）
    ///
    /// users.authoritiesはCSVで保持し、user_authoritiesは正規化テーブル。
    /// 再挿入の重複はON CONFLICT DO NOTHINGで無害化します。
    async fn sync_authorities(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &HashedUser,
    ) -> Result<()> {
        let user_id = user.record.user_id;

        sqlx::query("DELETE FROM user_authorities WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .with_context(|| format!("Failed to clear authorities for '{}'", user_id))?;

        for authority in user.record.authorities {
            sqlx::query(
                "INSERT INTO user_authorities (user_id, authority)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(authority)
            .execute(&mut **tx)
            .await
            .with_context(|| {
                format!("Failed to insert authority '{}' for '{}'", authority, user_id)
            })?;
        }
        Ok(())
    }

    /// 投入結果の検証レポートを生成
    pub async fn verify(&self, pool: &PgPool) -> Result<String> {
        let rows = sqlx::query(
            "SELECT user_id, user_name, user_real_name, email, authorities, enabled
             FROM users
             WHERE user_id IN ('admin', 'user')
             ORDER BY user_id",
        )
        .fetch_all(pool)
        .await
        .with_context(|| "Failed to verify provisioned users")?;

        let mut output = String::from("\n[users]\n");
        output.push_str(&format!(
            "{:<12} {:<12} {:<25} {:<25} enabled\n",
            "user_id", "user_name", "email", "authorities"
        ));
        for row in &rows {
            let user_id: String = row.try_get("user_id")?;
            let user_name: Option<String> = row.try_get("user_name")?;
            let email: String = row.try_get("email")?;
            let authorities: Option<String> = row.try_get("authorities")?;
            let enabled: bool = row.try_get("enabled")?;
            output.push_str(&format!(
                "{:<12} {:<12} {:<25} {:<25} {}\n",
                user_id,
                user_name.unwrap_or_default(),
                email,
                authorities.unwrap_or_default(),
                enabled
            ));
        }
        Ok(output)
    }
}

impl Default for UserProvisionerService {
    fn default() -> Self {
        Self::new()
    }
}

/// ネイティブの$2b$タグを検証器互換の$2a$へ書き換える
///
/// アルゴリズムは同一なので、タグの書き換えはセキュリティ上の変換ではなく
/// 互換性シムです。
fn spring_compatible_tag(hashed: String) -> String {
    match hashed.strip_prefix("$2b$") {
        Some(rest) => format!("$2a${}", rest),
        None => hashed,
    }
}
