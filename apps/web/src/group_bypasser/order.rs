//! 面板开关的排列顺序
//!
//! 顺序保存在节点属性 `order_titles` 中, 为逗号分隔的分组标题

use std::collections::HashMap;

use strum_macros::{AsRefStr, Display, EnumString};

/// 节点属性名
pub const PROP_ORDER_MODE: &str = "order_mode";
pub const PROP_ORDER_TITLES: &str = "order_titles";

/// 排列模式
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OrderMode {
    /// 画布顺序
    #[default]
    Auto,
    /// 按 order_titles 排列
    Custom,
}

/// 解析逗号分隔的标题, 去除空白和空项, 重复项只保留第一次
pub fn parse_order(order_titles: &str) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for title in order_titles.split(',').map(str::trim) {
        if title.is_empty() || titles.iter().any(|t| t == title) {
            continue;
        }
        titles.push(title.to_string());
    }
    titles
}

/// 保存时的字符串形式
pub fn join_order(titles: &[String]) -> String {
    titles.join(", ")
}

/// 排序编辑器的初始列表
///
/// 已保存且仍存在的标题在前, 其余标题按画布顺序追加
pub fn editor_order(current: &[String], order_titles: &str) -> Vec<String> {
    let known: Vec<String> = parse_order(order_titles)
        .into_iter()
        .filter(|title| current.contains(title))
        .collect();
    let missing: Vec<String> = current
        .iter()
        .filter(|title| !known.contains(title))
        .cloned()
        .collect();

    let mut order = known;
    order.extend(missing);
    order
}

/// 面板中开关的分组下标顺序
///
/// 自定义模式下按标题在 order_titles 中的位置稳定排序,
/// 未列出的分组排在最后并保持画布顺序; 同名分组共用一个位置
pub fn ordered_groups(titles: &[String], mode: OrderMode, order_titles: &str) -> Vec<usize> {
    let mut order: Vec<usize> = (0..titles.len()).collect();
    if mode != OrderMode::Custom {
        return order;
    }

    let desired = parse_order(order_titles);
    if desired.is_empty() {
        return order;
    }

    let position: HashMap<&str, usize> = desired
        .iter()
        .enumerate()
        .map(|(index, title)| (title.as_str(), index))
        .collect();

    order.sort_by_key(|&index| {
        position
            .get(titles[index].as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });
    order
}

/// 分组标题签名, 标题列表变化时重建开关
pub fn titles_signature(titles: &[String]) -> String {
    format!("{}:{}", titles.len(), titles.join("|"))
}

/// 开关标签, 含 Parent 的分组标注 cascade
pub fn toggle_label(title: &str, cascade: bool) -> String {
    if cascade {
        format!("{title} (cascade)")
    } else {
        title.to_string()
    }
}

/// 面板高度
pub fn panel_height(toggle_count: usize) -> f64 {
    (120.0 + toggle_count as f64 * 28.0).max(220.0)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order(" B , A,, B ,C "), titles(&["B", "A", "C"]));
        assert!(parse_order("").is_empty());
        assert!(parse_order(" , ,").is_empty());
    }

    #[test]
    fn test_order_mode() {
        assert_eq!(OrderMode::from_str("custom"), Ok(OrderMode::Custom));
        assert_eq!(OrderMode::Auto.to_string(), "auto");
        assert!(OrderMode::from_str("manual").is_err());
    }

    #[test]
    fn test_ordered_groups_custom() {
        let current = titles(&["A", "B", "C", "D"]);
        assert_eq!(
            ordered_groups(&current, OrderMode::Custom, "C, X, A"),
            vec![2, 0, 1, 3]
        );
        // 自动模式忽略 order_titles
        assert_eq!(
            ordered_groups(&current, OrderMode::Auto, "C, A"),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            ordered_groups(&current, OrderMode::Custom, " , "),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_ordered_groups_duplicate_titles() {
        let current = titles(&["Group", "A", "Group"]);
        assert_eq!(
            ordered_groups(&current, OrderMode::Custom, "Group"),
            vec![0, 2, 1]
        );
    }

    #[test]
    fn test_editor_order() {
        let current = titles(&["A", "B", "C"]);
        assert_eq!(editor_order(&current, "C, gone, A"), titles(&["C", "A", "B"]));
        assert_eq!(editor_order(&current, ""), current);
        assert_eq!(join_order(&titles(&["C", "A", "B"])), "C, A, B");
    }

    #[test]
    fn test_panel_layout() {
        assert_eq!(titles_signature(&titles(&["A", "B"])), "2:A|B");
        assert_eq!(titles_signature(&[]), "0:");
        assert_eq!(toggle_label("A", true), "A (cascade)");
        assert_eq!(toggle_label("A", false), "A");
        assert_eq!(panel_height(0), 220.0);
        assert_eq!(panel_height(10), 400.0);
    }
}
