// メニューフラット化サービス
//
// 階層メニュー定義を深さ優先の前順走査でフラットな行列へ変換します。
// - ノードは子孫より先に出力される（親が先、子が後）
// - order_seqは親ごとにリセットされる兄弟内の1始まり順序
// - 補助メニュー（top/bottom/header)は再帰なしのフラット行として出力
//
// parent_idの参照整合性はDB制約ではなく出力順序で保証されるため、
// 出力の分割（ルート行が先）が挿入順序の根拠になります。

use crate::core::menu::{MenuItem, MenuRow, MenuType, MenusData};

/// メニューフラット化サービス
#[derive(Debug, Clone)]
pub struct MenuFlattenerService {}

impl MenuFlattenerService {
    /// 新しいMenuFlattenerServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// menusData全体をフラットな行列へ変換
    ///
    /// サイドバーツリー（1ロール分）を再帰的に展開した後、
    /// top/bottom/headerの各リストをフラット行として追加します。
    pub fn flatten(&self, data: &MenusData) -> Vec<MenuRow> {
        let mut rows = Vec::new();

        if let Some(sidebar) = data.primary_sidebar() {
            self.flatten_sidebar(sidebar, None, &mut rows);
        }

        self.flatten_auxiliary(&data.top_menus, MenuType::Top, &mut rows);
        self.flatten_auxiliary(&data.bottom_menus, MenuType::Bottom, &mut rows);
        self.flatten_auxiliary(&data.header_menus, MenuType::Header, &mut rows);

        rows
    }

    /// サイドバーツリーを前順走査でフラット化
    fn flatten_sidebar(
        &self,
        items: &[MenuItem],
        parent_id: Option<&str>,
        rows: &mut Vec<MenuRow>,
    ) {
        for (index, item) in items.iter().enumerate() {
            let has_children = !item.children.is_empty();

            rows.push(MenuRow {
                id: item.id.clone(),
                parent_id: parent_id.map(|p| p.to_string()),
                label: item.label.clone(),
                icon: item.icon.clone(),
                path: item.path.clone(),
                order_seq: (index + 1) as u32,
                is_parent: has_children || item.is_parent == Some(true),
                show_in_drawer: item.show_in_drawer != Some(false),
                menu_type: MenuType::Sidebar,
                is_public: item.is_public != Some(false),
                badge: item.badge_text(),
                action: item.action.clone(),
            });

            if has_children {
                self.flatten_sidebar(&item.children, Some(&item.id), rows);
            }
        }
    }

    /// 補助メニューリストをフラット行として出力
    ///
    /// IDは種別接頭辞で書き換え、親なし・非ドロワー表示で固定します。
    fn flatten_auxiliary(&self, items: &[MenuItem], menu_type: MenuType, rows: &mut Vec<MenuRow>) {
        for (index, item) in items.iter().enumerate() {
            rows.push(MenuRow {
                id: format!("{}{}", menu_type.id_prefix(), item.id),
                parent_id: None,
                label: item.label.clone(),
                icon: item.icon.clone(),
                path: item.path.clone(),
                order_seq: (index + 1) as u32,
                is_parent: false,
                show_in_drawer: false,
                menu_type,
                is_public: item.is_public != Some(false),
                badge: item.badge_text(),
                action: item.action.clone(),
            });
        }
    }

    /// 行列をルート行と子行に分割
    ///
    /// ルート行（parent_id = NULL）を先に挿入することで、
    /// 子行の親参照が必ず先行して存在することを保証します。
    pub fn partition(&self, rows: Vec<MenuRow>) -> (Vec<MenuRow>, Vec<MenuRow>) {
        rows.into_iter().partition(|row| row.is_root())
    }
}

impl Default for MenuFlattenerService {
    fn default() -> Self {
        Self::new()
    }
}
