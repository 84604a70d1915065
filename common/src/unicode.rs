//! Unicodeエスケープ変換
//!
//! C4Dの文字列テーブルは非ASCII文字を `\uXXXX`（UTF-16コード単位）で持つ。

/// 非ASCII文字を `\uxxxx` に変換する（ASCIIはそのまま）
///
/// BMP外の文字はサロゲートペア2つに分かれる。
///
/// # Examples
/// ```
/// use c4d_localizer_common::to_unicode_escape;
///
/// assert_eq!(to_unicode_escape("中 A"), "\\u4e2d A");
/// ```
pub fn to_unicode_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        if unit > 127 {
            out.push_str(&format!("\\u{:04x}", unit));
        } else {
            out.push(char::from(unit as u8));
        }
    }
    out
}

/// `\uXXXX` を文字に戻す（16進は大文字小文字どちらも可）
///
/// 対になっていないサロゲートや不正な列はそのまま残す。
pub fn decode_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let escaped = &rest[pos..];

        let Some(unit) = parse_escape(escaped) else {
            out.push_str("\\u");
            rest = &escaped[2..];
            continue;
        };

        if (0xD800..0xDC00).contains(&unit) {
            let low = parse_escape(&escaped[6..]).filter(|u| (0xDC00..0xE000).contains(u));
            if let Some(low) = low {
                if let Some(Ok(c)) = char::decode_utf16([unit, low]).next() {
                    out.push(c);
                    rest = &escaped[12..];
                    continue;
                }
            }
        }

        match char::from_u32(u32::from(unit)) {
            Some(c) => out.push(c),
            None => out.push_str(&escaped[..6]),
        }
        rest = &escaped[6..];
    }

    out.push_str(rest);
    out
}

/// 先頭の `\uXXXX` を1つ読む
fn parse_escape(text: &str) -> Option<u16> {
    let hex = text.strip_prefix("\\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}
