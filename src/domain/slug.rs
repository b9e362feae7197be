use regex::Regex;
use std::sync::LazyLock;

// U+FEFF 也當作空白
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\x{FEFF}]+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").unwrap());
static REPEATED_HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// 由部落格標題產生網址用的 slug
///
/// 步驟：轉小寫、空白轉 `-`、移除非 ASCII 單字字元、合併連續 `-`、去掉頭尾 `-`。
/// 任何輸入都會得到結果，且 `slugify(slugify(x)) == slugify(x)`。
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let stripped = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = REPEATED_HYPHENS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}
