mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use fixtura_generate::{Factory, StackState};
use support::{Node, Tree, chain_depth, init_tracing, tree_levels};

fn node_factory(limit: usize) -> Factory<Node> {
    let nodes = Factory::new(Node::default()).unwrap();
    nodes
        .attr("label", |args| Ok(format!("level-{}", args.depth())))
        .unwrap()
        .sub_recursive_factory("child", &nodes, move || limit)
        .unwrap();
    nodes
}

#[test]
fn recursive_factory_stops_at_the_limit() {
    init_tracing();
    for limit in [0, 1, 3] {
        let node = node_factory(limit).create().unwrap();
        assert_eq!(chain_depth(&node), limit, "limit {limit}");
    }
}

#[test]
fn recursive_levels_are_linked_to_their_parents() {
    let node = node_factory(2).create().unwrap();
    assert_eq!(node.label, "level-0");
    let child = node.child.as_deref().unwrap();
    assert_eq!(child.label, "level-1");
    let grandchild = child.child.as_deref().unwrap();
    assert_eq!(grandchild.label, "level-2");
    assert!(grandchild.child.is_none());
}

#[test]
fn recursion_state_is_not_carried_between_builds() {
    let nodes = node_factory(3);
    let first = nodes.create().unwrap();
    let second = nodes.create().unwrap();
    assert_eq!(chain_depth(&first), 3);
    assert_eq!(chain_depth(&second), 3);
}

#[test]
fn limit_is_evaluated_once_per_lineage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let nodes = Factory::new(Node::default()).unwrap();
    nodes
        .sub_recursive_factory("child", &nodes, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            4
        })
        .unwrap();

    let node = nodes.create().unwrap();
    assert_eq!(chain_depth(&node), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    nodes.create().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn nested_builds_see_their_counter_count_down() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let nodes = Factory::new(Node::default()).unwrap();
    nodes
        .attr("label", move |args| {
            let state = args
                .pipeline()
                .map(|pipeline| pipeline.state(1))
                .unwrap_or(StackState::Uninitialized);
            log.lock().push(state);
            Ok("node")
        })
        .unwrap()
        .sub_recursive_factory("child", &nodes, || 2)
        .unwrap();

    nodes.create().unwrap();
    assert_eq!(
        *seen.lock(),
        vec![
            StackState::Uninitialized,
            StackState::Active(1),
            StackState::Active(0),
        ]
    );
}

#[test]
fn recursive_slice_factory_builds_siblings_per_level() {
    let trees = Factory::new(Tree::default()).unwrap();
    trees
        .seq_string("name", |n| Ok(format!("tree-{n}")))
        .unwrap()
        .sub_recursive_slice_factory("children", &trees, || 3, || 2)
        .unwrap();

    let tree = trees.create().unwrap();
    assert_eq!(tree_levels(&tree), vec![1, 3, 9]);
}

#[test]
fn recursive_slice_factory_with_zero_limit_leaves_field_unset() {
    let trees = Factory::new(Tree::default()).unwrap();
    trees
        .sub_recursive_slice_factory("children", &trees, || 5, || 0)
        .unwrap();

    let tree = trees.create().unwrap();
    assert!(tree.children.is_empty());
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Forest {
    name: String,
    trees: Vec<Node>,
}

#[test]
fn slice_elements_do_not_share_recursion_counters() {
    let nodes = node_factory(2);
    let forests = Factory::new(Forest::default()).unwrap();
    forests
        .sub_slice_factory("trees", &nodes, || 4)
        .unwrap();

    let forest = forests.create().unwrap();
    assert_eq!(forest.trees.len(), 4);
    for node in &forest.trees {
        assert_eq!(node.label, "level-1");
        assert_eq!(chain_depth(node), 2);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    employer: Option<Box<Company>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Company {
    title: String,
    founder: Option<Box<Person>>,
}

#[test]
fn mutually_recursive_factories_terminate() {
    let people = Factory::new(Person {
        name: "person".to_string(),
        ..Person::default()
    })
    .unwrap();
    let companies = Factory::new(Company {
        title: "company".to_string(),
        ..Company::default()
    })
    .unwrap();
    people
        .sub_recursive_factory("employer", &companies, || 2)
        .unwrap();
    companies
        .sub_recursive_factory("founder", &people, || 2)
        .unwrap();

    // Both recursive fields sit at position 1 and therefore share a counter.
    let person = people.create().unwrap();
    let company = person.employer.as_deref().unwrap();
    assert_eq!(company.title, "company");
    let founder = company.founder.as_deref().unwrap();
    assert_eq!(founder.name, "person");
    assert!(founder.employer.is_none());
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Folder {
    name: String,
    entry: Option<Box<Entry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Entry {
    title: String,
    folder: Option<Box<Folder>>,
}

#[test]
fn recursion_limit_holds_across_plain_sub_factory_hops() {
    let folders = Factory::new(Folder::default()).unwrap();
    let entries = Factory::new(Entry::default()).unwrap();
    folders
        .attr("name", |args| Ok(format!("folder-{}", args.depth())))
        .unwrap()
        .sub_recursive_factory("entry", &entries, || 2)
        .unwrap();
    entries
        .sub_factory("folder", &folders)
        .unwrap();

    let root = folders.create().unwrap();
    let mut names = vec![root.name.clone()];
    let mut current = &root;
    while let Some(entry) = current.entry.as_deref() {
        current = entry.folder.as_deref().unwrap();
        names.push(current.name.clone());
    }
    assert_eq!(names, vec!["folder-0", "folder-2", "folder-4"]);
    assert!(current.entry.is_none());
}
