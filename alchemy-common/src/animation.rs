//! Animation event plans and paced event streams
//!
//! A plan is the deterministic sequence of node and link reveals for one
//! search; the stream replays it with a fixed delay between events so clients
//! can animate the discovery.

use crate::corpus::is_primitive;
use crate::graph::ElementGraph;
use crate::search::{bfs_forward, bidirectional, dfs_backward, PathNode, SearchAlgorithm};
use futures::stream::Stream;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

/// Element revealed by a node event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationNode {
    pub name: String,
    pub image_path: String,
}

/// Ingredient to product edge revealed by a link event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationLink {
    pub source: String,
    pub target: String,
}

/// Message pushed to animation clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnimationEvent {
    Metadata {
        algorithm: String,
        element: String,
    },
    #[serde(rename_all = "camelCase")]
    Steps { total_steps: usize },
    #[serde(rename_all = "camelCase")]
    Node {
        node: AnimationNode,
        is_base_node: bool,
        step_index: usize,
        total_steps: usize,
    },
    #[serde(rename_all = "camelCase")]
    Link {
        link: AnimationLink,
        step_index: usize,
        total_steps: usize,
    },
    #[serde(rename_all = "camelCase")]
    Complete { nodes_visited: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationStep {
    Node(AnimationNode),
    Link(AnimationLink),
}

/// Ordered reveals for one element and algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationPlan {
    pub algorithm: SearchAlgorithm,
    pub element: String,
    pub steps: Vec<AnimationStep>,
    pub nodes_visited: usize,
}

impl AnimationPlan {
    /// Run `algorithm` for `target` and lay out its first path as reveals
    ///
    /// The caller is responsible for rejecting unknown targets.
    pub fn build(graph: &ElementGraph, target: &str, algorithm: SearchAlgorithm) -> Self {
        let (steps, nodes_visited) = match algorithm {
            SearchAlgorithm::Bfs => {
                let outcome = bfs_forward(graph, target, 1, true);
                let path = outcome.paths.into_iter().next().unwrap_or_default();
                (forward_steps(graph, &path), outcome.visited)
            }
            SearchAlgorithm::Dfs => {
                let outcome = dfs_backward(graph, target, 1);
                let path = outcome.paths.into_iter().next().unwrap_or_default();
                (backward_steps(&path), outcome.visited)
            }
            SearchAlgorithm::Bidirectional => {
                let outcome = bidirectional(graph, target, 1, true);
                let path = outcome.paths.into_iter().next().unwrap_or_default();
                (bidirectional_steps(target, &path), outcome.visited)
            }
        };

        debug!(
            "Animation plan for {} ({}): {} steps",
            target,
            algorithm,
            steps.len()
        );

        Self {
            algorithm,
            element: target.to_string(),
            steps,
            nodes_visited,
        }
    }

    /// Every event in emission order
    pub fn events(&self) -> Vec<AnimationEvent> {
        let total_steps = self.steps.len();
        let mut events = Vec::with_capacity(total_steps + 3);
        events.push(AnimationEvent::Metadata {
            algorithm: self.algorithm.to_string(),
            element: self.element.clone(),
        });
        events.push(AnimationEvent::Steps { total_steps });

        for (step_index, step) in self.steps.iter().enumerate() {
            events.push(match step {
                AnimationStep::Node(node) => AnimationEvent::Node {
                    is_base_node: is_primitive(&node.name),
                    node: node.clone(),
                    step_index,
                    total_steps,
                },
                AnimationStep::Link(link) => AnimationEvent::Link {
                    link: link.clone(),
                    step_index,
                    total_steps,
                },
            });
        }

        events.push(AnimationEvent::Complete {
            nodes_visited: self.nodes_visited,
        });
        events
    }

    /// Replay the plan, sleeping `delay` between consecutive events
    pub fn into_stream(self, delay: Duration) -> impl Stream<Item = AnimationEvent> {
        let events = self.events();
        let element = self.element;

        async_stream::stream! {
            info!("Animation stream for {} started ({} events)", element, events.len());
            let mut first = true;
            for event in events {
                if !first {
                    tokio::time::sleep(delay).await;
                }
                first = false;
                yield event;
            }
            debug!("Animation stream for {} finished", element);
        }
    }
}

fn node_step(name: &str, image_path: &str) -> AnimationStep {
    AnimationStep::Node(AnimationNode {
        name: name.to_string(),
        image_path: image_path.to_string(),
    })
}

fn link_step(source: &str, target: &str) -> AnimationStep {
    AnimationStep::Link(AnimationLink {
        source: source.to_string(),
        target: target.to_string(),
    })
}

/// Ingredient links of every derived node, path order, duplicates removed
fn path_links(path: &[PathNode]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for node in path {
        if let Some(ingredients) = &node.ingredients {
            for ingredient in ingredients {
                let link = (ingredient.clone(), node.element.clone());
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }
    }
    links
}

/// Primitives first, then derived nodes level by level, then all links
fn forward_steps(graph: &ElementGraph, path: &[PathNode]) -> Vec<AnimationStep> {
    let mut steps = Vec::new();
    for primitive in graph.primitives() {
        steps.push(node_step(primitive, &graph.image_ref(primitive)));
    }

    let mut levels: HashMap<&str, usize> = HashMap::new();
    let mut derived: Vec<(usize, &PathNode)> = Vec::new();
    for node in path {
        if is_primitive(&node.element) {
            levels.insert(&node.element, 0);
            continue;
        }
        let level = node
            .ingredients
            .as_ref()
            .map(|ings| {
                1 + ings
                    .iter()
                    .map(|i| levels.get(i.as_str()).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(1);
        levels.insert(&node.element, level);
        derived.push((level, node));
    }
    derived.sort_by_key(|(level, _)| *level);

    for (_, node) in derived {
        steps.push(node_step(&node.element, &node.image_path));
    }
    for (source, target) in path_links(path) {
        steps.push(link_step(&source, &target));
    }
    steps
}

/// Target-first path order; a link to the node just revealed goes inline
fn backward_steps(path: &[PathNode]) -> Vec<AnimationStep> {
    let mut steps = Vec::new();
    let mut shown: HashSet<&str> = HashSet::new();
    let mut linked: HashSet<(String, String)> = HashSet::new();

    for (index, node) in path.iter().enumerate() {
        if !shown.insert(&node.element) {
            continue;
        }
        steps.push(node_step(&node.element, &node.image_path));

        if index == 0 {
            continue;
        }
        let previous = &path[index - 1];
        let feeds_previous = previous
            .ingredients
            .as_ref()
            .is_some_and(|ings| ings.contains(&node.element));
        if feeds_previous {
            let link = (node.element.clone(), previous.element.clone());
            if linked.insert(link.clone()) {
                steps.push(link_step(&link.0, &link.1));
            }
        }
    }

    for link in path_links(path) {
        if linked.insert(link.clone()) {
            steps.push(link_step(&link.0, &link.1));
        }
    }
    steps
}

/// Target, then primitives, then the rest alternating from both path ends
fn bidirectional_steps(target: &str, path: &[PathNode]) -> Vec<AnimationStep> {
    let mut steps = Vec::new();
    let mut shown: HashSet<&str> = HashSet::new();

    if let Some(node) = path.iter().find(|n| n.element == target) {
        shown.insert(&node.element);
        steps.push(node_step(&node.element, &node.image_path));
    }
    for node in path.iter().filter(|n| is_primitive(&n.element)) {
        if shown.insert(&node.element) {
            steps.push(node_step(&node.element, &node.image_path));
        }
    }

    let rest: Vec<&PathNode> = path
        .iter()
        .filter(|n| !shown.contains(n.element.as_str()))
        .collect();
    let (mut front, mut back) = (0usize, rest.len());
    let mut from_front = true;
    while front < back {
        let node = if from_front {
            front += 1;
            rest[front - 1]
        } else {
            back -= 1;
            rest[back]
        };
        from_front = !from_front;
        if shown.insert(&node.element) {
            steps.push(node_step(&node.element, &node.image_path));
        }
    }

    for (source, target) in path_links(path) {
        steps.push(link_step(&source, &target));
    }
    steps
}
