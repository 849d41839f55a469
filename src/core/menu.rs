// メニュードメインモデル
//
// init.jsonの階層メニュー定義（MenuItem）と、
// リレーショナル表現にフラット化した行（MenuRow）を定義します。

use serde::Deserialize;
use std::collections::BTreeMap;

/// メニュー配置種別
///
/// サイドバーが既定のメニュー種別（DB上のタグはNULL）。
/// top/bottom/headerは補助的な配置で、IDにそれぞれの接頭辞が付与されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuType {
    /// サイドバーメニュー（既定、menu_type = NULL）
    Sidebar,
    /// 上部メニュー
    Top,
    /// 下部メニュー
    Bottom,
    /// ヘッダーメニュー
    Header,
}

impl MenuType {
    /// DBのmenu_typeカラムに格納するタグ（サイドバーはNULL）
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            MenuType::Sidebar => None,
            MenuType::Top => Some("top"),
            MenuType::Bottom => Some("bottom"),
            MenuType::Header => Some("header"),
        }
    }

    /// ID衝突を防ぐための接頭辞
    ///
    /// 補助メニューのIDはサイドバーと同じID空間から採られるため、
    /// 種別ごとの接頭辞で名前空間を分離します。
    pub fn id_prefix(&self) -> &'static str {
        match self {
            MenuType::Sidebar => "",
            MenuType::Top => "top-",
            MenuType::Bottom => "bottom-",
            MenuType::Header => "header-",
        }
    }
}

/// 階層メニュー定義（init.jsonの1ノード）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// メニューID（ツリー内で一意）
    pub id: String,
    /// 表示ラベル
    pub label: String,
    /// アイコン名
    #[serde(default)]
    pub icon: Option<String>,
    /// 遷移先パス
    #[serde(default)]
    pub path: Option<String>,
    /// 親メニューとして扱うかの明示フラグ
    #[serde(default)]
    pub is_parent: Option<bool>,
    /// ドロワーに表示するか（既定: true）
    #[serde(default)]
    pub show_in_drawer: Option<bool>,
    /// 公開メニューか（既定: true）
    #[serde(rename = "public", default)]
    pub is_public: Option<bool>,
    /// バッジ（文字列または数値）
    #[serde(default)]
    pub badge: Option<serde_json::Value>,
    /// クリック時アクション
    #[serde(default)]
    pub action: Option<String>,
    /// 子メニュー（順序付き）
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// バッジ値をテキスト表現へ正規化
    ///
    /// 数値は文字列化し、空でない文字列はそのまま使い、
    /// それ以外（null、空文字列、真偽値など）はバッジなしとして扱います。
    pub fn badge_text(&self) -> Option<String> {
        match &self.badge {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// init.jsonのmenusDataセクション
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MenusData {
    /// ロール名 → サイドバーメニューツリー
    #[serde(default)]
    pub menus: BTreeMap<String, Vec<MenuItem>>,
    /// 上部メニュー（フラット）
    #[serde(default)]
    pub top_menus: Vec<MenuItem>,
    /// 下部メニュー（フラット）
    #[serde(default)]
    pub bottom_menus: Vec<MenuItem>,
    /// ヘッダーメニュー（フラット）
    #[serde(default)]
    pub header_menus: Vec<MenuItem>,
}

impl MenusData {
    /// フラット化対象のサイドバーメニューツリーを選択
    ///
    /// 複数ロールの展開は非対応。"customer" ロールを優先し、
    /// 存在しなければ最初のロールを使います。
    pub fn primary_sidebar(&self) -> Option<&[MenuItem]> {
        self.menus
            .get("customer")
            .or_else(|| self.menus.values().next())
            .map(|items| items.as_slice())
    }
}

/// init.jsonのトップレベル構造
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDocument {
    /// メニュー定義セクション（欠落は致命的エラー）
    pub menus_data: Option<MenusData>,
}

/// フラット化したメニュー行
///
/// 不変条件: parent_idが非NULLの行は、同一バッチ内で先に挿入される行の
/// idを参照しなければならない（親が先、子が後）。この順序はDB制約ではなく
/// 挿入順序で保証されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    /// メニューID（補助メニューは種別接頭辞付き）
    pub id: String,
    /// 親メニューID（ルート行はNone）
    pub parent_id: Option<String>,
    /// 表示ラベル
    pub label: String,
    /// アイコン名
    pub icon: Option<String>,
    /// 遷移先パス
    pub path: Option<String>,
    /// 兄弟内の1始まり順序
    pub order_seq: u32,
    /// 子を持つか、または明示的に親扱いされたか
    pub is_parent: bool,
    /// ドロワーに表示するか
    pub show_in_drawer: bool,
    /// メニュー配置種別
    pub menu_type: MenuType,
    /// 公開メニューか
    pub is_public: bool,
    /// バッジテキスト
    pub badge: Option<String>,
    /// クリック時アクション
    pub action: Option<String>,
}

impl MenuRow {
    /// ルート行（親を持たない行）かどうか
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_from_json(value: serde_json::Value) -> MenuItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_menu_type_tags_and_prefixes() {
        assert_eq!(MenuType::Sidebar.tag(), None);
        assert_eq!(MenuType::Top.tag(), Some("top"));
        assert_eq!(MenuType::Bottom.tag(), Some("bottom"));
        assert_eq!(MenuType::Header.tag(), Some("header"));

        assert_eq!(MenuType::Sidebar.id_prefix(), "");
        assert_eq!(MenuType::Top.id_prefix(), "top-");
        assert_eq!(MenuType::Bottom.id_prefix(), "bottom-");
        assert_eq!(MenuType::Header.id_prefix(), "header-");
    }

    #[test]
    fn test_menu_item_deserializes_camel_case() {
        let item = item_from_json(json!({
            "id": "dashboard",
            "label": "Dashboard",
            "path": "/dashboard",
            "showInDrawer": false,
            "isParent": true,
            "public": false
        }));

        assert_eq!(item.id, "dashboard");
        assert_eq!(item.path.as_deref(), Some("/dashboard"));
        assert_eq!(item.show_in_drawer, Some(false));
        assert_eq!(item.is_parent, Some(true));
        assert_eq!(item.is_public, Some(false));
        assert!(item.children.is_empty());
    }

    #[test]
    fn test_badge_text_coerces_numbers() {
        let item = item_from_json(json!({"id": "x", "label": "X", "badge": 3}));
        assert_eq!(item.badge_text().as_deref(), Some("3"));

        let zero = item_from_json(json!({"id": "x", "label": "X", "badge": 0}));
        assert_eq!(zero.badge_text().as_deref(), Some("0"));
    }

    #[test]
    fn test_badge_text_keeps_nonempty_strings() {
        let item = item_from_json(json!({"id": "x", "label": "X", "badge": "NEW"}));
        assert_eq!(item.badge_text().as_deref(), Some("NEW"));
    }

    #[test]
    fn test_badge_text_drops_falsy_values() {
        let empty = item_from_json(json!({"id": "x", "label": "X", "badge": ""}));
        assert_eq!(empty.badge_text(), None);

        let null = item_from_json(json!({"id": "x", "label": "X", "badge": null}));
        assert_eq!(null.badge_text(), None);

        let flag = item_from_json(json!({"id": "x", "label": "X", "badge": false}));
        assert_eq!(flag.badge_text(), None);

        let absent = item_from_json(json!({"id": "x", "label": "X"}));
        assert_eq!(absent.badge_text(), None);
    }

    #[test]
    fn test_primary_sidebar_prefers_customer_role() {
        let data: MenusData = serde_json::from_value(json!({
            "menus": {
                "admin": [{"id": "a", "label": "A"}],
                "customer": [{"id": "c", "label": "C"}]
            }
        }))
        .unwrap();

        let sidebar = data.primary_sidebar().unwrap();
        assert_eq!(sidebar.len(), 1);
        assert_eq!(sidebar[0].id, "c");
    }

    #[test]
    fn test_primary_sidebar_falls_back_to_first_role() {
        let data: MenusData = serde_json::from_value(json!({
            "menus": {
                "staff": [{"id": "s", "label": "S"}]
            }
        }))
        .unwrap();

        assert_eq!(data.primary_sidebar().unwrap()[0].id, "s");
    }

    #[test]
    fn test_primary_sidebar_none_when_empty() {
        let data = MenusData::default();
        assert!(data.primary_sidebar().is_none());
    }
}
