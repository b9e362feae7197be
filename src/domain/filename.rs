use unicode_normalization::UnicodeNormalization;

/// 上傳檔名清理：去除變音符號，非 `[A-Za-z0-9.-]` 的字元換成 `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 物件儲存用的唯一鍵：`{毫秒時間戳}-{清理後檔名}`
pub fn unique_object_key(name: &str, now_millis: i64) -> String {
    format!("{}-{}", now_millis, sanitize_file_name(name))
}
