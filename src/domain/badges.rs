use serde::Serialize;
use serde_json::Value;

pub const ADMIN_BADGE: &str = "admin";

/// 徽章對應的圖示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeIcon {
    pub badge: String,
    pub src: &'static str,
    pub size_px: u16,
    pub tooltip: Option<&'static str>,
}

const SHIELD_ICON: &str = "/images/shield-antivirus-svgrepo-com.svg";
const SUPPORT_ICON: &str = "/images/customer-support-chat-svgrepo-com.svg";

/// 解析 profile 的 `badges` 欄位
///
/// 欄位可能是字串陣列、JSON 編碼的字串、空字串或不存在。無法解析時回傳空列表。
/// 若含有 `admin`，它會排在第一位且只出現一次，其餘徽章保持原順序。
pub fn resolve_badges(raw: Option<&Value>) -> Vec<String> {
    let badges = match raw {
        Some(Value::Array(items)) => strings_of(items),
        Some(Value::String(text)) if text.trim().is_empty() => Vec::new(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => strings_of(&items),
            Ok(other) => {
                tracing::warn!("Badges field is not an array: {}", other);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to parse badges field: {}", e);
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    admin_first(badges)
}

fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn admin_first(badges: Vec<String>) -> Vec<String> {
    if !badges.iter().any(|b| b == ADMIN_BADGE) {
        return badges;
    }

    std::iter::once(ADMIN_BADGE.to_string())
        .chain(badges.into_iter().filter(|b| b != ADMIN_BADGE))
        .collect()
}

pub fn icon_for(badge: &str) -> BadgeIcon {
    let (src, size_px, tooltip) = match badge {
        ADMIN_BADGE => (SHIELD_ICON, 25, Some("Admin")),
        "support" => (SUPPORT_ICON, 35, Some("Támogatás")),
        _ => (SHIELD_ICON, 20, None),
    };

    BadgeIcon {
        badge: badge.to_string(),
        src,
        size_px,
        tooltip,
    }
}

pub fn badge_icons(raw: Option<&Value>) -> Vec<BadgeIcon> {
    resolve_badges(raw).iter().map(|b| icon_for(b)).collect()
}
