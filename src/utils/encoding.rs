use encoding_rs::GB18030;

/// 文本资源解码：优先 UTF-8（去掉 BOM），否则按 GB18030 处理
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => gb18030_to_utf8(bytes),
    }
}

pub fn gb18030_to_utf8(bytes: &[u8]) -> String {
    let (cow, _, _) = GB18030.decode(bytes);
    cow.into_owned()
}
