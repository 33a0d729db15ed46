// 表单编码工具
// 按网关要求的 http_build_query (RFC1738) 规则生成规范查询串

use std::sync::OnceLock;
use regex::Regex;
use url::form_urlencoded;

/// 编码单个键或值
///
/// 只保留 `[A-Za-z0-9_.-]`，空格编码为 `+`，其余字节编码为大写 `%XX`。
/// `form_urlencoded` 会保留 `*`，网关侧编码为 `%2A`，这里单独处理。
pub fn php_urlencode(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
}

/// 生成规范查询串: `key=value` 按给定顺序以 `&` 连接
///
/// 调用方负责排序，通常直接传入 `BTreeMap` 的迭代器。
pub fn canonical_query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", php_urlencode(key), php_urlencode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// 统一已编码串中的换行
///
/// 网关对多行地址的换行编码不稳定，`%0D%0A`、`%0A%0D`、`%0D` 均视为 `%0A`，
/// 大小写不敏感。
pub fn normalize_line_endings(encoded: &str) -> String {
    static LINE_ENDINGS: OnceLock<Regex> = OnceLock::new();
    let re = LINE_ENDINGS.get_or_init(|| {
        Regex::new(r"(?i)%0D%0A|%0A%0D|%0A|%0D").expect("line ending pattern is valid")
    });
    re.replace_all(encoded, "%0A").into_owned()
}
