// 初期アカウントモデル
//
// seed-usersコマンドが投入する組み込みユーザーレコードの定義。
// 外部入力はなく、固定リストを実行ごとにハッシュ化して投入します。

/// 初期投入するユーザーレコード
///
/// パスワードは平文で保持され、投入前にハッシュ化されます。
/// 平文が永続化されることはありません。
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// ユーザーID（主キー）
    pub user_id: &'static str,
    /// ログイン名
    pub user_name: &'static str,
    /// 表示名
    pub user_real_name: &'static str,
    /// メールアドレス
    pub email: &'static str,
    /// 電話番号
    pub phone: &'static str,
    /// 平文パスワード（入力専用）
    pub password: &'static str,
    /// 有効フラグ
    pub enabled: bool,
    /// アカウント有効期限フラグ
    pub account_non_expired: bool,
    /// アカウントロックフラグ
    pub account_non_locked: bool,
    /// 資格情報有効期限フラグ
    pub credentials_non_expired: bool,
    /// 権限ロール（空であってはならない）
    pub authorities: &'static [&'static str],
}

impl UserRecord {
    /// usersテーブルのCSVカラム用に権限を結合
    pub fn authorities_csv(&self) -> String {
        self.authorities.join(",")
    }
}

/// ハッシュ化済みユーザー
///
/// UserRecordにハッシュ済みパスワードを添えたもの。
#[derive(Debug, Clone)]
pub struct HashedUser {
    /// 元のユーザーレコード
    pub record: UserRecord,
    /// 検証器互換のタグ付きハッシュ
    pub hashed_password: String,
}

/// 組み込みの初期アカウントリスト
///
/// 管理者(admin)と一般ユーザー(user)の2アカウント。
pub fn builtin_users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            user_id: "admin",
            user_name: "admin",
            user_real_name: "Administrator",
            email: "admin@groundwork.local",
            phone: "010-0000-0001",
            password: "admin1234!",
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            authorities: &["ROLE_ADMIN", "ROLE_USER"],
        },
        UserRecord {
            user_id: "user",
            user_name: "user",
            user_real_name: "Default User",
            email: "user@groundwork.local",
            phone: "010-0000-0002",
            password: "user1234!",
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            authorities: &["ROLE_USER"],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_users_are_two_known_accounts() {
        let users = builtin_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, "admin");
        assert_eq!(users[1].user_id, "user");
    }

    #[test]
    fn test_builtin_users_have_nonempty_authorities() {
        for user in builtin_users() {
            assert!(!user.authorities.is_empty(), "user {}", user.user_id);
        }
    }

    #[test]
    fn test_admin_has_both_roles() {
        let users = builtin_users();
        assert_eq!(users[0].authorities, &["ROLE_ADMIN", "ROLE_USER"]);
        assert_eq!(users[0].authorities_csv(), "ROLE_ADMIN,ROLE_USER");
    }

    #[test]
    fn test_all_accounts_enabled() {
        for user in builtin_users() {
            assert!(user.enabled);
            assert!(user.account_non_expired);
            assert!(user.account_non_locked);
            assert!(user.credentials_non_expired);
        }
    }
}
