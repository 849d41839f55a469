// サービス層
// 初期化パイプラインの各段階（読み込み → 変換 → 組み立て → 適用 / 比較）

pub mod menu_flattener;
pub mod menu_source;
pub mod migration_applier;
pub mod sql_assembler;
pub mod table_comparator;
pub mod user_provisioner;
