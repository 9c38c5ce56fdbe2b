//! 标签解析与匹配模块
//!
//! 徽章标签从逗号分隔文本解析为规范化的有序集合（去空白、转小写、
//! 去重且保留首次出现顺序），只在存储边界序列化回逗号分隔文本。
//! 匹配提供 ANY / ALL 两种集合语义。

/// 解析逗号分隔的标签输入为规范化有序集合
///
/// 空白项被丢弃，重复项只保留第一次出现。
pub fn normalize(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let tag = raw.trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    tags
}

/// 规范化查询标签列表（与 `normalize` 相同的清洗规则）
pub fn normalize_query(tags: &[&str]) -> Vec<String> {
    normalize(&tags.join(","))
}

/// 序列化为存储形式（逗号分隔文本）
///
/// 空集合序列化为空字符串，读取侧将其还原为空集合。
pub fn to_storage(tags: &[String]) -> String {
    tags.join(",")
}

/// 从存储形式还原标签集合
pub fn from_storage(stored: &str) -> Vec<String> {
    normalize(stored)
}

/// 集合匹配判定
///
/// - `match_all = false`（ANY）：徽章标签集与查询集交集非空即命中
/// - `match_all = true`（ALL）：徽章标签集是查询集的超集才命中
///
/// 查询集为空时不命中任何徽章。
pub fn matches(badge_tags: &[String], query: &[String], match_all: bool) -> bool {
    if query.is_empty() {
        return false;
    }
    if match_all {
        query.iter().all(|q| badge_tags.contains(q))
    } else {
        query.iter().any(|q| badge_tags.contains(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_casefolds() {
        assert_eq!(normalize("test, Tester ,TEST"), vec!["test", "tester"]);
        assert_eq!(normalize("  a,, b ,"), vec!["a", "b"]);
        assert!(normalize("").is_empty());
        assert!(normalize(" , ,").is_empty());
    }

    #[test]
    fn normalize_keeps_first_seen_order() {
        assert_eq!(normalize("zeta, alpha, zeta"), vec!["zeta", "alpha"]);
    }

    #[test]
    fn storage_roundtrip() {
        let tags = normalize("test, tester");
        assert_eq!(to_storage(&tags), "test,tester");
        assert_eq!(from_storage("test,tester"), tags);
        assert!(from_storage("").is_empty());
    }

    #[test]
    fn any_mode_intersects() {
        let badge = normalize("test");
        let query = normalize_query(&["test", "tester"]);
        assert!(matches(&badge, &query, false));

        let unrelated = normalize("other");
        assert!(!matches(&unrelated, &query, false));
    }

    #[test]
    fn all_mode_requires_superset() {
        let query = normalize_query(&["test", "tester"]);
        let both = normalize("test, tester");
        let only_one = normalize("test");
        assert!(matches(&both, &query, true));
        assert!(!matches(&only_one, &query, true));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let badge = normalize("test");
        assert!(!matches(&badge, &[], false));
        assert!(!matches(&badge, &[], true));
    }
}
