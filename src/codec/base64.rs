//! 多字母表 base64 解码
//!
//! 订阅源混用标准、URL-safe、有无填充的 base64, 依次尝试, 全部失败时原样返回。

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// 依次尝试 standard / url-safe / raw standard / raw url-safe,
/// 解码结果必须是合法 UTF-8, 否则返回原始字符串
pub fn decode_lossy(raw: &str) -> String {
    try_decode(raw).unwrap_or_else(|| raw.to_string())
}

/// 与 [`decode_lossy`] 相同, 但解码失败时返回 `None`
pub fn try_decode(raw: &str) -> Option<String> {
    let engines = [&STANDARD, &URL_SAFE, &STANDARD_NO_PAD, &URL_SAFE_NO_PAD];
    engines.iter().find_map(|engine| {
        engine
            .decode(raw.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    })
}

/// 标准 base64 编码 (带填充)
pub fn encode_std(data: &str) -> String {
    STANDARD.encode(data.as_bytes())
}

/// URL-safe base64 编码 (无填充), 用于 ssr 链接
pub fn encode_url(data: &str) -> String {
    URL_SAFE_NO_PAD.encode(data.as_bytes())
}
