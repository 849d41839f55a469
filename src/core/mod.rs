// コアドメインロジック
// 設定、エラー型、メニューモデル、実行ステップ、初期アカウント定義

pub mod config;
pub mod error;
pub mod menu;
pub mod step;
pub mod user;
