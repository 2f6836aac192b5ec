//! The classification hierarchy as a tree of [`Node`]s.
//!
//! The tree is derived from a [`Table`] by repeatedly asking the table for the
//! children of a code (see [`Code::child_range`]). Nodes serialize with the
//! field names a UI tree widget expects: `value`, `label`, `description` and
//! `children` (omitted for leaves).

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{Code, Record, Table};

/// A single element of the classification tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The classification code, or [`Code::ROOT`] for the synthetic root.
    pub value: Code,

    /// Short display label, `"{code}: {title}"` for every node but the root.
    pub label: String,

    /// Long-form description.
    pub description: String,

    /// Direct children, in table order. Empty for leaves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a leaf node.
    #[must_use]
    pub fn new(value: Code, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// Creates a synthetic root node.
    ///
    /// The label is used as given; it is never prefixed with a code.
    #[must_use]
    pub fn root(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Code::ROOT, label, description)
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The number of edges on the longest path from this node to a leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// The number of nodes in this subtree, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always `false`: a tree contains at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over this subtree in pre-order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Finds the first node with the given value, searching depth-first.
    #[must_use]
    pub fn find(&self, value: Code) -> Option<&Self> {
        self.iter().find(|node| node.value == value)
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Self::new(record.code, record.title, record.description)
    }
}

/// Pre-order iterator over a [`Node`] and its descendants.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds the tree below `root` from `table`.
///
/// The children of each node are the table rows in the node's child range,
/// in table order. Recursion stops at leaves and at `max_depth` edges below
/// `root`; `max_depth = 0` returns `root` without children.
///
/// Any children `root` already had are replaced if the table yields some.
#[must_use]
#[instrument(level = "debug", skip(table, root), fields(root = %root.value))]
pub fn build_tree(table: &Table, root: Node, max_depth: usize) -> Node {
    let tree = build_node(table, root, 0, max_depth);
    debug!(nodes = tree.len(), depth = tree.depth(), "built tree");
    tree
}

fn build_node(table: &Table, mut node: Node, level: usize, max_depth: usize) -> Node {
    let children = table.children(node.value);

    if !children.is_empty() && level < max_depth {
        node.children = children
            .into_iter()
            .map(|record| build_node(table, Node::from(record), level + 1, max_depth))
            .collect();
    }

    node
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{RawRecord, RawTable};

    fn table(rows: &[(&str, &str, &str)]) -> Table {
        rows.iter()
            .map(|(code, title, description)| RawRecord::new(*code, *title, *description))
            .collect::<RawTable>()
            .normalize()
            .unwrap()
    }

    fn root() -> Node {
        Node::root("NAICS 2022", "test root")
    }

    fn naics() -> Table {
        table(&[
            ("11", "Agriculture, Forestry, Fishing and HuntingT", "sector 11"),
            ("111", "Crop ProductionT", "subsector 111"),
            ("1111", "Oilseed and Grain FarmingT", "group 1111"),
            ("11111", "Soybean FarmingT", "industry 11111"),
            ("111110", "Soybean Farming", "national industry 111110"),
            ("31-33", "ManufacturingT", "sector 31"),
            ("311", "Food ManufacturingT", "subsector 311"),
            ("321", "Wood Product ManufacturingT", "subsector 321"),
            ("331", "Primary Metal ManufacturingT", "subsector 331"),
            ("44-45", "Retail TradeT", "sector 44"),
            ("455", "General Merchandise RetailersT", "subsector 455"),
            ("48-49", "Transportation and WarehousingT", "sector 48"),
            ("492", "Couriers and MessengersT", "subsector 492"),
        ])
    }

    #[test]
    fn end_to_end_scenario() {
        let table = table(&[
            ("31-33", "Manufacturing", "d1"),
            ("311", "Food MfgT", "d2"),
            ("312", "Beverage Mfg", "d3"),
        ]);

        let tree = build_tree(&table, root(), 5);

        let expected = Node {
            children: vec![Node {
                children: vec![
                    Node::new(Code::new(311), "311: Food Mfg", "d2"),
                    Node::new(Code::new(312), "312: Beverage Mfg", "d3"),
                ],
                ..Node::new(Code::new(31), "31: Manufacturing", "d1")
            }],
            ..root()
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn sector_ranges_collect_merged_codes() {
        let tree = build_tree(&naics(), root(), 20);

        let children = |code: u64| -> Vec<u64> {
            tree.find(Code::new(code))
                .unwrap()
                .children
                .iter()
                .map(|c| c.value.get())
                .collect()
        };

        assert_eq!(children(0), vec![11, 31, 44, 48]);
        assert_eq!(children(31), vec![311, 321, 331]);
        assert_eq!(children(44), vec![455]);
        assert_eq!(children(48), vec![492]);
        assert_eq!(children(11111), vec![111_110]);
    }

    #[test]
    fn root_label_is_not_prefixed() {
        let tree = build_tree(&naics(), root(), 20);
        assert_eq!(tree.label, "NAICS 2022");
        assert_eq!(tree.value, Code::ROOT);
    }

    #[test]
    fn labels_are_prefixed_and_stripped() {
        let tree = build_tree(&naics(), root(), 20);
        assert_eq!(
            tree.find(Code::new(11111)).unwrap().label,
            "11111: Soybean Farming"
        );
    }

    #[test_case(0; "zero")]
    #[test_case(1; "one")]
    #[test_case(2; "two")]
    #[test_case(3; "three")]
    #[test_case(20; "beyond table depth")]
    fn depth_is_bounded(max_depth: usize) {
        let tree = build_tree(&naics(), root(), max_depth);
        assert!(tree.depth() <= max_depth);
        assert_eq!(tree.depth(), max_depth.min(5));
    }

    #[test]
    fn zero_depth_yields_bare_root() {
        let tree = build_tree(&naics(), root(), 0);
        assert!(tree.is_leaf());
        assert_eq!(tree, root());
    }

    #[test]
    fn nodes_without_children_in_table_are_leaves() {
        let table = naics();
        let tree = build_tree(&table, root(), 20);
        for node in &tree {
            if table.child_keys(node.value).is_empty() {
                assert!(node.is_leaf(), "{} should be a leaf", node.value);
            }
        }
    }

    #[test]
    fn every_record_appears_once() {
        let table = naics();
        let tree = build_tree(&table, root(), 20);
        assert_eq!(tree.len(), table.len() + 1);
    }

    #[test]
    fn building_is_deterministic() {
        let table = naics();
        let first = build_tree(&table, root(), 20);
        let second = build_tree(&table, root(), 20);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn empty_table_yields_bare_root() {
        let tree = build_tree(&Table::default(), root(), 20);
        assert_eq!(tree, root());
    }

    #[test]
    fn subtree_from_record() {
        let table = naics();
        let start = Node::from(table.children(Code::new(11)).into_iter().next().unwrap());
        let tree = build_tree(&table, start, 20);

        assert_eq!(tree.label, "111: Crop Production");
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn deep_limit_terminates_at_table_depth() {
        let tree = build_tree(&naics(), root(), 1_000_000);
        assert_eq!(tree.depth(), 5);
        assert!(
            RawTable::new(vec![RawRecord::new("0", "Loop", "")])
                .normalize()
                .is_err()
        );
    }

    #[test]
    fn serializes_with_widget_field_names() {
        let table = table(&[("11", "Agriculture", "d1"), ("111", "Crops", "d2")]);
        let tree = build_tree(&table, root(), 20);

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": 0,
                "label": "NAICS 2022",
                "description": "test root",
                "children": [{
                    "value": 11,
                    "label": "11: Agriculture",
                    "description": "d1",
                    "children": [{
                        "value": 111,
                        "label": "111: Crops",
                        "description": "d2"
                    }]
                }]
            })
        );
    }

    #[test]
    fn pre_order_iteration() {
        let tree = build_tree(&naics(), root(), 20);
        let values: Vec<u64> = tree.iter().take(6).map(|n| n.value.get()).collect();
        assert_eq!(values, vec![0, 11, 111, 1111, 11111, 111_110]);
    }
}
