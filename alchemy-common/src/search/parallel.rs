//! Multi-threaded search variants
//!
//! Workers run on the blocking pool and push results into one bounded channel.
//!
//! The per-recipe variants (backward, bidirectional, trees) give every worker
//! its own quota of the requested count and tag each result with the worker's
//! recipe index. The merge sorts by that index before deduplicating, so their
//! output follows recipe order whatever order the workers ran in.
//!
//! The forward variant shares one frontier between its workers. Which element
//! a worker claims first depends on scheduling, and so can the set of paths it
//! returns when more paths exist than were requested.

use super::{
    bfs_forward, bidirectional, dfs_backward, primitive_anchors, BackwardSearch,
    BidirectionalOutcome, BidirectionalSearch, ForwardFrontier, RecipePath, SearchOutcome,
    TreeFlavor,
};
use crate::corpus::is_primitive;
use crate::graph::ElementGraph;
use crate::tree::{enumerate_recipe_trees, enumerate_trees, RecipeTree};
use crate::{Error, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Spawn one blocking task per worker and collect what they send
///
/// Each worker returns the number of nodes it visited.
async fn run_workers<T, W>(workers: Vec<W>, capacity: usize) -> Result<(Vec<T>, usize)>
where
    T: Send + 'static,
    W: FnOnce(mpsc::Sender<T>) -> usize + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(capacity.max(1));
    let mut handles = Vec::with_capacity(workers.len());
    for worker in workers {
        let tx = tx.clone();
        handles.push(tokio::task::spawn_blocking(move || worker(tx)));
    }
    drop(tx);

    let mut visited = 0;
    for handle in handles {
        visited += handle
            .await
            .map_err(|e| Error::InternalSearch(format!("search worker failed: {}", e)))?;
    }

    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    Ok((items, visited))
}

/// Channel capacity that lets every worker deliver `per_worker` results
fn worker_quota(per_worker: usize, workers: usize) -> usize {
    per_worker.saturating_mul(workers.max(1))
}

/// Shared forward state: one lock around known elements, paths and count
struct SharedForward {
    frontier: ForwardFrontier,
    found: bool,
}

/// Forward synthesis with one worker per primitive
///
/// Each worker drains a private queue seeded with its primitive. The whole
/// expansion of one element happens under the shared lock, so every element
/// still enters the frontier once.
pub async fn bfs_forward_parallel(
    graph: Arc<ElementGraph>,
    target: &str,
    max_results: usize,
    single_path: bool,
    cancel: CancellationToken,
) -> Result<SearchOutcome> {
    if !graph.contains(target) || is_primitive(target) {
        return Ok(bfs_forward(&graph, target, max_results, single_path));
    }

    let max_results = max_results.max(1);
    let shared = Arc::new(Mutex::new(SharedForward {
        frontier: ForwardFrontier::seeded(&graph),
        found: false,
    }));

    let workers: Vec<_> = graph
        .primitives()
        .into_iter()
        .map(|primitive| {
            let graph = Arc::clone(&graph);
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            let target = target.to_string();
            move |tx: mpsc::Sender<RecipePath>| {
                let mut queue = VecDeque::from([primitive.to_string()]);
                while let Some(current) = queue.pop_front() {
                    if cancel.is_cancelled() || tx.capacity() == 0 {
                        break;
                    }
                    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    if single_path && state.found {
                        break;
                    }
                    for element in state.frontier.expand(&graph, &current) {
                        if element == target {
                            if let Some(path) = state.frontier.path(&element) {
                                let _ = tx.try_send(path.clone());
                            }
                            state.found = true;
                        }
                        queue.push_back(element);
                    }
                }
                0
            }
        })
        .collect();

    let (paths, _) = run_workers(workers, max_results).await?;
    let visited = shared
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .frontier
        .visited;

    debug!(
        "bfs_forward_parallel({}): {} paths, {} visited",
        target,
        paths.len(),
        visited
    );
    Ok(SearchOutcome { paths, visited })
}

/// Backward decomposition with one worker per top-level recipe
pub async fn dfs_backward_parallel(
    graph: Arc<ElementGraph>,
    target: &str,
    max_results: usize,
    cancel: CancellationToken,
) -> Result<SearchOutcome> {
    if !graph.contains(target) || is_primitive(target) {
        return Ok(dfs_backward(&graph, target, max_results));
    }

    let max_results = max_results.max(1);
    let workers: Vec<_> = graph
        .usable_recipes(target)
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| {
            let graph = Arc::clone(&graph);
            let cancel = cancel.clone();
            let target = target.to_string();
            move |tx: mpsc::Sender<(usize, RecipePath)>| {
                BackwardSearch::new(&graph, &target, max_results, |path| {
                    tx.try_send((index, path)).is_ok()
                })
                .with_root_recipe(recipe)
                .with_cancellation(cancel)
                .run()
            }
        })
        .collect();
    let worker_count = workers.len();

    let (mut tagged, visited) =
        run_workers(workers, worker_quota(max_results, worker_count)).await?;
    tagged.sort_by_key(|(index, _)| *index);

    let mut paths: Vec<RecipePath> = Vec::new();
    for (_, path) in tagged {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths.truncate(max_results);

    debug!(
        "dfs_backward_parallel({}): {} paths, {} visited",
        target,
        paths.len(),
        visited
    );
    Ok(SearchOutcome { paths, visited })
}

/// Bidirectional search with one worker per top-level recipe
pub async fn bidirectional_parallel(
    graph: Arc<ElementGraph>,
    target: &str,
    max_results: usize,
    single_path: bool,
    cancel: CancellationToken,
) -> Result<BidirectionalOutcome> {
    if !graph.contains(target) || is_primitive(target) {
        return Ok(bidirectional(&graph, target, max_results, single_path));
    }

    let max_results = max_results.max(1);
    let workers: Vec<_> = graph
        .usable_recipes(target)
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| {
            let graph = Arc::clone(&graph);
            let cancel = cancel.clone();
            let target = target.to_string();
            move |tx: mpsc::Sender<(usize, RecipePath, String)>| {
                let outcome = BidirectionalSearch::new(&graph, &target, max_results, single_path)
                    .with_root_recipe(recipe)
                    .with_cancellation(cancel)
                    .run();
                for (path, meeting) in outcome.paths.into_iter().zip(outcome.meeting_points) {
                    if tx.try_send((index, path, meeting)).is_err() {
                        break;
                    }
                }
                outcome.visited
            }
        })
        .collect();
    let worker_count = workers.len();

    let (mut tagged, visited) =
        run_workers(workers, worker_quota(max_results, worker_count)).await?;
    tagged.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BidirectionalOutcome {
        visited,
        ..Default::default()
    };
    let mut anchors_seen = HashSet::new();
    for (_, path, meeting) in tagged {
        if outcome.paths.len() >= max_results || (single_path && !outcome.paths.is_empty()) {
            break;
        }
        if anchors_seen.insert(primitive_anchors(&path)) {
            outcome.paths.push(path);
            outcome.meeting_points.push(meeting);
        }
    }

    debug!(
        "bidirectional_parallel({}): {} paths, {} visited",
        target,
        outcome.paths.len(),
        outcome.visited
    );
    Ok(outcome)
}

/// Tree enumeration with one worker per top-level recipe
pub async fn enumerate_trees_parallel(
    graph: Arc<ElementGraph>,
    target: &str,
    max_count: usize,
    flavor: TreeFlavor,
    cancel: CancellationToken,
) -> Result<(Vec<RecipeTree>, usize)> {
    let recipes = graph.usable_recipes(target);
    if recipes.is_empty() || is_primitive(target) {
        return Ok(enumerate_trees(&graph, target, max_count, flavor));
    }

    let max_count = max_count.max(1);
    let workers: Vec<_> = recipes
        .into_iter()
        .enumerate()
        .map(|(index, recipe)| {
            let graph = Arc::clone(&graph);
            let cancel = cancel.clone();
            let target = target.to_string();
            move |tx: mpsc::Sender<(usize, RecipeTree)>| {
                if cancel.is_cancelled() {
                    return 0;
                }
                let (trees, visited) =
                    enumerate_recipe_trees(&graph, &target, recipe, max_count, flavor);
                for tree in trees {
                    if cancel.is_cancelled() || tx.try_send((index, tree)).is_err() {
                        break;
                    }
                }
                visited
            }
        })
        .collect();
    let worker_count = workers.len();

    let (mut tagged, visited) =
        run_workers(workers, worker_quota(max_count, worker_count)).await?;
    tagged.sort_by_key(|(index, _)| *index);

    let mut signatures = HashSet::new();
    let mut trees: Vec<RecipeTree> = tagged
        .into_iter()
        .map(|(_, tree)| tree)
        .filter(|tree| signatures.insert(tree.signature()))
        .collect();
    trees.truncate(max_count);

    if trees.is_empty() {
        return Ok(enumerate_trees(&graph, target, max_count, flavor));
    }
    Ok((trees, visited))
}
