#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Opt-in log output for tests, driven by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub author_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub author: User,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub label: String,
    pub child: Option<Box<Node>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub name: String,
    pub children: Vec<Tree>,
}

/// Number of nested nodes below `node`.
pub fn chain_depth(node: &Node) -> usize {
    std::iter::successors(node.child.as_deref(), |n| n.child.as_deref()).count()
}

/// Node count at each level of `tree`, root first.
pub fn tree_levels(tree: &Tree) -> Vec<usize> {
    let mut levels = Vec::new();
    let mut current = vec![tree];
    while !current.is_empty() {
        levels.push(current.len());
        current = current
            .iter()
            .flat_map(|tree| tree.children.iter())
            .collect();
    }
    levels
}
