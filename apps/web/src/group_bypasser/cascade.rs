//! 分组旁路与级联
//!
//! 面板开关一个分组时:
//! - 分组内有 Parent 节点: 对每个 Parent 级联, 即 Parent 所在分组
//!   加上从 Parent 输出 0 沿连线可达的 Child 节点所在分组一起切换
//! - 否则只切换该分组
//!
//! 图结构通过 [`GroupGraph`] 读取, 与浏览器对象解耦

use std::collections::{HashSet, VecDeque};

/// 节点 id
pub type NodeId = i64;

/// ComfyUI 的旁路模式
pub const BYPASS_MODE: i64 = 4;
/// LiteGraph.ALWAYS
pub const ALWAYS_MODE: i64 = 0;

pub const PARENT_CLASS: &str = "HYBS_GroupBypasser_Parent";
pub const CHILD_CLASS: &str = "HYBS_GroupBypasser_Child";
pub const PANEL_CLASS: &str = "HYBS_GroupBypasser_Panel";

/// 未命名分组的标题
pub const DEFAULT_GROUP_TITLE: &str = "Group";

/// 画布图结构, 分组以下标访问
pub trait GroupGraph {
    /// 分组数量
    fn group_count(&self) -> usize;

    /// 分组标题, 非字符串时为 None
    fn group_title(&self, group: usize) -> Option<String>;

    /// 分组内节点 (重新计算后)
    fn group_nodes(&self, group: usize) -> Vec<NodeId>;

    /// 节点的 comfyClass
    fn node_class(&self, node: NodeId) -> Option<String>;

    fn node_mode(&self, node: NodeId) -> Option<i64>;

    fn set_node_mode(&mut self, node: NodeId, mode: i64);

    /// 指定输出槽位连线指向的、仍存在的节点
    fn output_targets(&self, node: NodeId, slot: usize) -> Vec<NodeId>;
}

/// 分组标题, 缺省为 "Group"
pub fn group_title<G: GroupGraph + ?Sized>(graph: &G, group: usize) -> String {
    graph
        .group_title(group)
        .unwrap_or_else(|| DEFAULT_GROUP_TITLE.to_string())
}

/// 全部分组标题, 按画布顺序
pub fn group_titles<G: GroupGraph + ?Sized>(graph: &G) -> Vec<String> {
    (0..graph.group_count())
        .map(|group| group_title(graph, group))
        .collect()
}

/// 分组内任意节点处于旁路模式即视为已旁路, 空分组为 false
pub fn is_group_bypassed<G: GroupGraph + ?Sized>(graph: &G, group: usize) -> bool {
    graph
        .group_nodes(group)
        .into_iter()
        .any(|node| graph.node_mode(node) == Some(BYPASS_MODE))
}

/// 设置分组内全部节点的模式
pub fn set_group_bypass<G: GroupGraph + ?Sized>(graph: &mut G, group: usize, bypass: bool) {
    let mode = if bypass { BYPASS_MODE } else { ALWAYS_MODE };
    for node in graph.group_nodes(group) {
        graph.set_node_mode(node, mode);
    }
}

/// 包含该节点的全部分组
pub fn groups_containing<G: GroupGraph + ?Sized>(graph: &G, node: NodeId) -> Vec<usize> {
    (0..graph.group_count())
        .filter(|&group| graph.group_nodes(group).contains(&node))
        .collect()
}

fn is_class<G: GroupGraph + ?Sized>(graph: &G, node: NodeId, class: &str) -> bool {
    graph.node_class(node).as_deref() == Some(class)
}

/// 分组内的 Parent 节点
pub fn parent_nodes_in_group<G: GroupGraph + ?Sized>(graph: &G, group: usize) -> Vec<NodeId> {
    graph
        .group_nodes(group)
        .into_iter()
        .filter(|&node| is_class(graph, node, PARENT_CLASS))
        .collect()
}

pub fn group_has_parent<G: GroupGraph + ?Sized>(graph: &G, group: usize) -> bool {
    graph
        .group_nodes(group)
        .into_iter()
        .any(|node| is_class(graph, node, PARENT_CLASS))
}

/// 从 Parent 输出 0 广度优先查找 Child 节点
///
/// 只收集 Child, 并沿 Child 的输出 0 继续链式查找; 其他节点不再展开
pub fn collect_child_nodes<G: GroupGraph + ?Sized>(graph: &G, parent: NodeId) -> Vec<NodeId> {
    let mut visited = HashSet::new();
    let mut queue: VecDeque<NodeId> = graph.output_targets(parent, 0).into();
    let mut children = Vec::new();

    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            continue;
        }
        if is_class(graph, node, CHILD_CLASS) {
            children.push(node);
            queue.extend(graph.output_targets(node, 0));
        }
    }
    children
}

/// Parent 级联涉及的分组, 按首次出现顺序去重
pub fn cascade_groups<G: GroupGraph + ?Sized>(graph: &G, parent: NodeId) -> Vec<usize> {
    let mut groups = groups_containing(graph, parent);
    for child in collect_child_nodes(graph, parent) {
        for group in groups_containing(graph, child) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }
    groups
}

/// 面板开关一个分组, 返回实际切换的分组
pub fn toggle_group<G: GroupGraph + ?Sized>(graph: &mut G, group: usize, bypass: bool) -> Vec<usize> {
    let parents = parent_nodes_in_group(graph, group);
    if parents.is_empty() {
        set_group_bypass(graph, group, bypass);
        return vec![group];
    }

    let mut toggled = Vec::new();
    for parent in parents {
        for target in cascade_groups(graph, parent) {
            set_group_bypass(graph, target, bypass);
            if !toggled.contains(&target) {
                toggled.push(target);
            }
        }
    }
    toggled
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct FakeGraph {
        groups: Vec<(Option<String>, Vec<NodeId>)>,
        classes: HashMap<NodeId, String>,
        modes: HashMap<NodeId, i64>,
        links: HashMap<NodeId, Vec<NodeId>>,
    }

    impl FakeGraph {
        fn node(mut self, id: NodeId, class: &str) -> Self {
            self.classes.insert(id, class.to_string());
            self.modes.insert(id, ALWAYS_MODE);
            self
        }

        fn group(mut self, title: &str, nodes: &[NodeId]) -> Self {
            self.groups.push((Some(title.to_string()), nodes.to_vec()));
            self
        }

        fn link(mut self, from: NodeId, to: NodeId) -> Self {
            self.links.entry(from).or_default().push(to);
            self
        }
    }

    impl GroupGraph for FakeGraph {
        fn group_count(&self) -> usize {
            self.groups.len()
        }

        fn group_title(&self, group: usize) -> Option<String> {
            self.groups.get(group).and_then(|(title, _)| title.clone())
        }

        fn group_nodes(&self, group: usize) -> Vec<NodeId> {
            self.groups
                .get(group)
                .map(|(_, nodes)| nodes.clone())
                .unwrap_or_default()
        }

        fn node_class(&self, node: NodeId) -> Option<String> {
            self.classes.get(&node).cloned()
        }

        fn node_mode(&self, node: NodeId) -> Option<i64> {
            self.modes.get(&node).copied()
        }

        fn set_node_mode(&mut self, node: NodeId, mode: i64) {
            self.modes.insert(node, mode);
        }

        fn output_targets(&self, node: NodeId, slot: usize) -> Vec<NodeId> {
            if slot != 0 {
                return Vec::new();
            }
            self.links
                .get(&node)
                .map(|targets| {
                    targets
                        .iter()
                        .copied()
                        .filter(|id| self.classes.contains_key(id))
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    /// A: Parent(1) + KSampler(2)
    /// B: Child(3) + VAE(4)
    /// C: Child(5), 由 Child(3) 链式连接
    /// D: KSampler(6), 无标记
    fn linked_graph() -> FakeGraph {
        FakeGraph::default()
            .node(1, PARENT_CLASS)
            .node(2, "KSampler")
            .node(3, CHILD_CLASS)
            .node(4, "VAEDecode")
            .node(5, CHILD_CLASS)
            .node(6, "KSampler")
            .group("A", &[1, 2])
            .group("B", &[3, 4])
            .group("C", &[5])
            .group("D", &[6])
            .link(1, 3)
            .link(3, 5)
    }

    #[test]
    fn test_collect_child_nodes_chain() {
        let graph = linked_graph();
        assert_eq!(collect_child_nodes(&graph, 1), vec![3, 5]);
        assert_eq!(cascade_groups(&graph, 1), vec![0, 1, 2]);
    }

    #[test]
    fn test_collect_child_nodes_stops_at_other_nodes() {
        // Parent → KSampler → Child: 中间节点不展开
        let graph = FakeGraph::default()
            .node(1, PARENT_CLASS)
            .node(2, "KSampler")
            .node(3, CHILD_CLASS)
            .link(1, 2)
            .link(2, 3);
        assert!(collect_child_nodes(&graph, 1).is_empty());
    }

    #[test]
    fn test_collect_child_nodes_cycle() {
        let graph = FakeGraph::default()
            .node(1, PARENT_CLASS)
            .node(2, CHILD_CLASS)
            .node(3, CHILD_CLASS)
            .link(1, 2)
            .link(2, 3)
            .link(3, 2)
            .link(3, 1);
        assert_eq!(collect_child_nodes(&graph, 1), vec![2, 3]);
    }

    #[test]
    fn test_dangling_link_is_ignored() {
        let graph = FakeGraph::default().node(1, PARENT_CLASS).link(1, 99);
        assert!(collect_child_nodes(&graph, 1).is_empty());
    }

    #[test]
    fn test_toggle_group_with_parent_cascades() {
        let mut graph = linked_graph();

        let toggled = toggle_group(&mut graph, 0, true);
        assert_eq!(toggled, vec![0, 1, 2]);
        for group in [0, 1, 2] {
            assert!(is_group_bypassed(&graph, group));
        }
        assert!(!is_group_bypassed(&graph, 3));

        toggle_group(&mut graph, 0, false);
        for node in 1..=5 {
            assert_eq!(graph.node_mode(node), Some(ALWAYS_MODE));
        }
    }

    #[test]
    fn test_toggle_group_without_parent_is_local() {
        let mut graph = linked_graph();

        // B 只有 Child, 不反向级联到 Parent
        assert_eq!(toggle_group(&mut graph, 1, true), vec![1]);
        assert!(is_group_bypassed(&graph, 1));
        assert!(!is_group_bypassed(&graph, 0));
        assert!(!is_group_bypassed(&graph, 2));
    }

    #[test]
    fn test_is_group_bypassed_any_node() {
        let mut graph = linked_graph();
        graph.set_node_mode(4, BYPASS_MODE);
        assert!(is_group_bypassed(&graph, 1));

        let empty = FakeGraph::default().group("empty", &[]);
        assert!(!is_group_bypassed(&empty, 0));
    }

    #[test]
    fn test_group_titles_default() {
        let mut graph = linked_graph();
        graph.groups.push((None, vec![]));
        assert_eq!(group_titles(&graph), vec!["A", "B", "C", "D", "Group"]);
        assert!(group_has_parent(&graph, 0));
        assert!(!group_has_parent(&graph, 1));
    }

    #[test]
    fn test_node_in_several_groups() {
        let graph = FakeGraph::default()
            .node(1, PARENT_CLASS)
            .group("outer", &[1])
            .group("inner", &[1]);
        assert_eq!(groups_containing(&graph, 1), vec![0, 1]);
        assert_eq!(cascade_groups(&graph, 1), vec![0, 1]);
    }
}
