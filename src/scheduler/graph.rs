//! Infers the dependency graph of systems from their declared access.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use itertools::Itertools;

use super::{Order, SystemIndex};
use crate::error::BuildError;
use crate::system::{Access, Spec};

/// A system in the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    index:      SystemIndex,
    debug_name: String,
    access:     Vec<Access>,
    children:   Vec<SystemIndex>,
    top_level:  bool,
}

impl Vertex {
    /// The registration index of the system.
    pub fn index(&self) -> SystemIndex { self.index }

    /// The name of the system.
    pub fn name(&self) -> &str { &self.debug_name }

    /// The declared access of the system.
    pub fn access(&self) -> &[Access] { &self.access }

    /// The systems that must complete before this system starts, in ascending order.
    pub fn children(&self) -> &[SystemIndex] { &self.children }

    /// Whether no other system lists this system as a child.
    ///
    /// Top-level systems are the sinks of the graph: nothing waits for them.
    pub fn is_top_level(&self) -> bool { self.top_level }
}

/// The organized dependency graph of all systems in a world.
///
/// Vertex `i` is the system with registration index `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    vertices: Vec<Vertex>,
}

impl Graph {
    /// All vertices in registration order.
    pub fn vertices(&self) -> &[Vertex] { &self.vertices }

    /// Gets the vertex of a system.
    pub fn vertex(&self, index: SystemIndex) -> Option<&Vertex> { self.vertices.get(index.0) }

    /// Finds a vertex by system name.
    pub fn find(&self, name: &str) -> Option<&Vertex> {
        self.vertices.iter().find(|vertex| vertex.debug_name == name)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize { self.vertices.len() }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    /// Iterates over all edges as `(prerequisite, dependent)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (SystemIndex, SystemIndex)> + '_ {
        self.vertices
            .iter()
            .flat_map(|vertex| vertex.children.iter().map(move |&child| (child, vertex.index)))
    }

    /// Renders the graph in Graphviz DOT format.
    ///
    /// Top-level vertices are drawn as double circles.
    /// Edges point from a prerequisite to its dependent.
    pub fn dot(&self) -> impl fmt::Display + '_ {
        struct Dot<'t>(&'t Graph);

        impl<'t> fmt::Display for Dot<'t> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                writeln!(f, "digraph tickgraph {{")?;
                writeln!(f, "rankdir=RL;")?;
                for (i, vertex) in self.0.vertices.iter().enumerate() {
                    let shape = if vertex.top_level { "doublecircle" } else { "circle" };
                    writeln!(f, "n{i}[shape={shape} label={:?}];", vertex.debug_name)?;
                }
                for (child, parent) in self.0.edges() {
                    writeln!(f, "n{} -> n{};", child.0, parent.0)?;
                }
                write!(f, "}}")
            }
        }

        Dot(self)
    }
}

/// Builds the dependency graph for `specs` in registration order.
///
/// For every pair of systems whose access conflicts,
/// the system registered earlier becomes a child of the system registered later.
/// Each order adds `before` as a child of `after`.
pub(crate) fn organize(specs: &[&Spec], orders: &[Order]) -> Result<Graph, BuildError> {
    validate(specs)?;

    let mut children: Vec<BTreeSet<SystemIndex>> = vec![BTreeSet::new(); specs.len()];

    for (later, later_spec) in specs.iter().enumerate() {
        for (earlier, earlier_spec) in specs[..later].iter().enumerate() {
            if earlier_spec.conflicts_with(later_spec) {
                children[later].insert(SystemIndex(earlier));
            }
        }
    }

    for order in orders {
        for index in [order.before, order.after] {
            if index.0 >= specs.len() {
                return Err(BuildError::UnknownSystem { index: index.0 });
            }
        }
        children[order.after.0].insert(order.before);
    }

    scan_cycles(&children, |index| specs[index.0].debug_name.clone())?;

    let mut top_level = vec![true; specs.len()];
    for child in children.iter().flatten() {
        top_level[child.0] = false;
    }

    let vertices = specs
        .iter()
        .zip(children)
        .zip(top_level)
        .enumerate()
        .map(|(index, ((spec, children), top_level))| Vertex {
            index: SystemIndex(index),
            debug_name: spec.debug_name.clone(),
            access: spec.access.clone(),
            children: children.into_iter().collect(),
            top_level,
        })
        .collect();

    Ok(Graph { vertices })
}

fn validate(specs: &[&Spec]) -> Result<(), BuildError> {
    let mut names: HashMap<&str, usize> = HashMap::new();
    for (index, spec) in specs.iter().enumerate() {
        if let Some(&first) = names.get(spec.debug_name.as_str()) {
            return Err(BuildError::DuplicateName {
                name: spec.debug_name.clone(),
                first,
                second: index,
            });
        }
        names.insert(&spec.debug_name, index);

        let mut types = HashSet::new();
        for access in &spec.access {
            if !types.insert(access.ty) {
                return Err(BuildError::ConflictingAccess {
                    system: spec.debug_name.clone(),
                    ty:     access.ty.name,
                });
            }
        }
    }

    Ok(())
}

/// Scans the child relation for cycles.
///
/// A cycle in `children` is also a cycle in the reversed relation,
/// so the path is reported in prerequisite order.
fn scan_cycles(
    children: &[BTreeSet<SystemIndex>],
    describe_node: impl Fn(SystemIndex) -> String,
) -> Result<(), BuildError> {
    let mut remaining: BTreeSet<SystemIndex> = (0..children.len()).map(SystemIndex).collect();
    let mut exited = HashSet::new();
    let mut stack = Vec::new();

    while let Some(&node) = remaining.iter().next() {
        scan_cycles_from(children, node, &mut remaining, &mut exited, &mut stack, &describe_node)?;
    }

    Ok(())
}

fn scan_cycles_from(
    children: &[BTreeSet<SystemIndex>],
    node: SystemIndex,
    remaining: &mut BTreeSet<SystemIndex>,
    exited: &mut HashSet<SystemIndex>,
    stack: &mut Vec<SystemIndex>,
    describe_node: &impl Fn(SystemIndex) -> String,
) -> Result<(), BuildError> {
    if exited.contains(&node) {
        return Ok(()); // already scanned
    }

    if !remaining.remove(&node) {
        // `stack` runs from dependents to their children, the reverse of execution order
        let mut cycle: Vec<SystemIndex> =
            stack.iter().copied().skip_while(|&ancestor| ancestor != node).collect();
        cycle.push(node);
        cycle.reverse();
        let path = cycle.into_iter().map(describe_node).join(" -> ");
        return Err(BuildError::CyclicDependency { path });
    }

    stack.push(node);

    for &child in children.get(node.0).expect("invalid node index") {
        scan_cycles_from(children, child, remaining, exited, stack, describe_node)?;
    }

    let popped = stack.pop();
    debug_assert_eq!(Some(node), popped);

    let new_exit = exited.insert(node);
    assert!(new_exit, "exited is inserted recursively but no cycles were detected");

    Ok(())
}
