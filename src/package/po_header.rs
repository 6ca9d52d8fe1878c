//! PO ファイルのヘッダー解析
//!
//! ヘッダーは先頭の `msgid ""` エントリの `msgstr` に `Key: value\n` の形で格納される。

/// 改訂日時のヘッダー名
pub const REVISION_DATE_HEADER: &str = "PO-Revision-Date";

/// ヘッダーから `PO-Revision-Date` を取り出す
///
/// ヘッダーが無い場合や値が空の場合は `None`
#[must_use]
pub fn parse_revision_date(content: &str) -> Option<String> {
    header_value(content, REVISION_DATE_HEADER)
}

/// ヘッダーの任意のフィールドを取り出す
#[must_use]
pub fn header_value(content: &str, key: &str) -> Option<String> {
    let header = header_block(content)?;
    header.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        let value = value.trim();
        (name.trim().eq_ignore_ascii_case(key) && !value.is_empty()).then(|| value.to_string())
    })
}

/// 先頭エントリが `msgid ""` の場合、その `msgstr` を連結して返す
fn header_block(content: &str) -> Option<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#'));

    let msgid = lines.next()?.strip_prefix("msgid")?;
    let mut msgid_value = unquote(msgid)?;
    let mut next = lines.next();
    while let Some(continuation) = next.and_then(unquote) {
        msgid_value.push_str(&continuation);
        next = lines.next();
    }
    if !msgid_value.is_empty() {
        return None;
    }

    let mut header = unquote(next?.strip_prefix("msgstr")?)?;
    for line in lines {
        match unquote(line) {
            Some(continuation) => header.push_str(&continuation),
            None => break,
        }
    }
    Some(header)
}

/// `"..."` を外してエスケープを解除する
fn unquote(raw: &str) -> Option<String> {
    let inner = raw.trim().strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}
