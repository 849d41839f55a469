// メニューソースローダー
//
// init.jsonを読み込み、menusDataセクションの存在を検証します。
// ここでの失敗はすべてデータベース接続前の致命的エラーです。

use crate::core::error::SourceError;
use crate::core::menu::{InitDocument, MenusData};
use std::fs;
use std::path::Path;

/// メニューソースローダー
#[derive(Debug, Clone)]
pub struct MenuSourceLoader {}

impl MenuSourceLoader {
    /// 新しいMenuSourceLoaderを作成
    pub fn new() -> Self {
        Self {}
    }

    /// init.jsonを読み込んでmenusDataを取り出す
    ///
    /// # Errors
    ///
    /// ファイルが読めない、JSONが不正、menusDataが存在しない場合にエラー。
    pub fn load(&self, path: &Path) -> Result<MenusData, SourceError> {
        let content = fs::read_to_string(path).map_err(|e| SourceError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let document: InitDocument =
            serde_json::from_str(&content).map_err(|e| SourceError::Parse {
                path: path.display().to_string(),
                cause: e.to_string(),
            })?;

        document.menus_data.ok_or_else(|| SourceError::MissingField {
            path: path.display().to_string(),
            field: "menusData".to_string(),
        })
    }
}

impl Default for MenuSourceLoader {
    fn default() -> Self {
        Self::new()
    }
}
