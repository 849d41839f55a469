// Groundworkライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインロジック（設定、メニューモデル、実行ステップ、エラー型）
// - adapters: データベース接続とSQL値レンダリングの抽象化
// - services: 初期化パイプラインの各段階（読み込み、変換、組み立て、適用、比較）

pub mod cli;
pub mod core;
pub mod adapters;
pub mod services;
