// 加密工具函数
// 提供SHA-512签名摘要、常量时间比较等安全功能

use std::collections::BTreeMap;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use crate::utils::encoding::{canonical_query_string, normalize_line_endings};

/// 计算SHA-512摘要
///
/// # Returns
/// * 小写十六进制字符串
pub fn sha512_hex(message: &str) -> String {
    hex::encode(Sha512::digest(message.as_bytes()))
}

/// 计算字段集合的签名摘要
///
/// 摘要输入为 `规范查询串 + 密钥`，换行统一后再做SHA-512。
/// 字段集合中不能包含 `signature` 本身。
///
/// # Arguments
/// * `fields` - 已按键排序的字段
/// * `secret` - 签名密钥
///
/// # Returns
/// * 十六进制摘要 (不含字段名后缀)
pub fn signature_digest(fields: &BTreeMap<String, String>, secret: &str) -> String {
    let mut message = canonical_query_string(fields);
    message.push_str(secret);
    sha512_hex(&normalize_line_endings(&message))
}

/// 常量时间字符串比较 (防止时序攻击)
///
/// # Arguments
/// * `a` - 字符串A
/// * `b` - 字符串B
///
/// # Returns
/// * 字符串是否相等
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
