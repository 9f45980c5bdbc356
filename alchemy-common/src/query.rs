//! Query façade: request-level operations over the shared element graph
//!
//! Every operation validates the target, clamps its count against
//! [`QueryLimits`], dispatches to a search kernel or tree builder and measures
//! wall-clock time. Path responses list primitives first and the target last.

use crate::animation::AnimationPlan;
use crate::config::QueryLimits;
use crate::corpus::{is_primitive, Corpus, Element};
use crate::graph::ElementGraph;
use crate::search::parallel::{
    bfs_forward_parallel, bidirectional_parallel, enumerate_trees_parallel,
};
use crate::search::{
    bfs_forward, bidirectional, dfs_backward, element_set, primitive_anchors, RecipePath,
    SearchAlgorithm, SearchOutcome, TreeFlavor,
};
use crate::tree::{enumerate_trees, tree_from_path, RecipeTree, TreeBuilder};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Exploration ceiling for the DFS-backed path queries
const DFS_EXPLORATION_LIMIT: usize = 20;

const DEFAULT_PATH_COUNT: usize = 5;
const DEFAULT_TREE_COUNT: usize = 5;
const DEFAULT_MULTIPLE_TREE_COUNT: usize = 3;

/// Body of `POST /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub target_element: String,
    pub algorithm: Option<String>,
    pub max_results: Option<i64>,
    pub single_path: bool,
}

/// Paths plus search statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub paths: Vec<RecipePath>,
    pub nodes_visited: usize,
    /// Milliseconds
    pub time_elapsed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidirectionalPathsResponse {
    pub paths: Vec<RecipePath>,
    pub meeting_points: Vec<String>,
    pub nodes_visited: usize,
    pub time_elapsed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreesResponse {
    pub trees: Vec<RecipeTree>,
    pub nodes_visited: usize,
    pub total_tree_nodes: usize,
    pub time_elapsed: f64,
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub tree: RecipeTree,
    pub nodes_visited: usize,
    pub time_elapsed: f64,
}

/// Bidirectional results as paths or as trees built from them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BidirectionalResponse {
    Paths(BidirectionalPathsResponse),
    Trees(TreesResponse),
}

/// Options of the bidirectional query
#[derive(Debug, Clone, Copy, Default)]
pub struct BidirectionalOptions {
    pub count: Option<usize>,
    pub multithreaded: bool,
    pub single: bool,
    pub tree: bool,
}

/// Tree count parameter: a number, or every tree up to the safety cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountParam {
    Limit(usize),
    All,
}

impl FromStr for CountParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CountParam::All);
        }
        s.trim()
            .parse::<usize>()
            .map(CountParam::Limit)
            .map_err(|_| Error::MalformedRequest(format!("invalid count: {}", s)))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Reverse target-first paths so primitives come first
fn forward_order(mut paths: Vec<RecipePath>) -> Vec<RecipePath> {
    for path in &mut paths {
        path.reverse();
    }
    paths
}

fn trees_response(
    trees: Vec<RecipeTree>,
    nodes_visited: usize,
    started: Instant,
    algorithm: &str,
) -> TreesResponse {
    TreesResponse {
        total_tree_nodes: trees.iter().map(RecipeTree::node_count).sum(),
        trees,
        nodes_visited,
        time_elapsed: elapsed_ms(started),
        algorithm: algorithm.to_string(),
    }
}

/// Stateless request operations over one immutable graph
#[derive(Debug, Clone)]
pub struct RecipeService {
    graph: Arc<ElementGraph>,
    limits: QueryLimits,
}

impl RecipeService {
    pub fn new(graph: Arc<ElementGraph>, limits: QueryLimits) -> Self {
        Self { graph, limits }
    }

    pub fn from_corpus(corpus: Corpus, limits: QueryLimits) -> Self {
        Self::new(Arc::new(ElementGraph::new(corpus)), limits)
    }

    pub fn graph(&self) -> &Arc<ElementGraph> {
        &self.graph
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.graph.contains(name) {
            Ok(())
        } else {
            Err(Error::UnknownElement(name.to_string()))
        }
    }

    fn path_count(&self, requested: Option<usize>, default: usize) -> usize {
        requested
            .unwrap_or(default)
            .clamp(1, self.limits.max_path_count.max(1))
    }

    fn tree_count(&self, requested: Option<usize>, default: usize) -> usize {
        requested
            .unwrap_or(default)
            .clamp(1, self.limits.max_tree_count.max(1))
    }

    /// All elements in corpus order
    pub fn list_elements(&self) -> &[Element] {
        self.graph.corpus().elements()
    }

    pub fn element(&self, name: &str) -> Result<&Element> {
        self.graph
            .element(name)
            .ok_or_else(|| Error::UnknownElement(name.to_string()))
    }

    /// `POST /api/search`
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let target = request.target_element.trim();
        if target.is_empty() {
            return Err(Error::MalformedRequest("targetElement is required".to_string()));
        }
        let algorithm = match request.algorithm.as_deref() {
            None | Some("") => SearchAlgorithm::Bfs,
            Some(name) => name.parse()?,
        };
        let max_results = request
            .max_results
            .filter(|&n| n > 0)
            .and_then(|n| usize::try_from(n).ok());
        let max_results = self.path_count(max_results, 1);

        info!(
            "Search request: {} via {} (max {}, single {})",
            target, algorithm, max_results, request.single_path
        );
        self.run_paths(algorithm, target, max_results, request.single_path)
    }

    /// `GET /api/recipes/{algo}/{name}`
    pub fn recipe_paths(
        &self,
        algorithm: SearchAlgorithm,
        name: &str,
        max_results: Option<usize>,
    ) -> Result<SearchResponse> {
        let max_results = self.path_count(max_results, 1);
        self.run_paths(algorithm, name, max_results, algorithm == SearchAlgorithm::Bfs)
    }

    fn run_paths(
        &self,
        algorithm: SearchAlgorithm,
        name: &str,
        max_results: usize,
        single_path: bool,
    ) -> Result<SearchResponse> {
        self.require(name)?;
        let started = Instant::now();

        let outcome = match algorithm {
            SearchAlgorithm::Bfs => bfs_forward(&self.graph, name, max_results, single_path),
            SearchAlgorithm::Dfs => {
                let limit = if single_path { 1 } else { max_results };
                let outcome = dfs_backward(&self.graph, name, limit);
                SearchOutcome {
                    paths: forward_order(outcome.paths),
                    visited: outcome.visited,
                }
            }
            SearchAlgorithm::Bidirectional => {
                let outcome = bidirectional(&self.graph, name, max_results, single_path);
                SearchOutcome {
                    paths: outcome.paths,
                    visited: outcome.visited,
                }
            }
        };

        Ok(SearchResponse {
            paths: outcome.paths,
            nodes_visited: outcome.visited,
            time_elapsed: elapsed_ms(started),
        })
    }

    /// Diverse paths: one per primitive-anchor set, then the shortest of the
    /// remaining paths with a new element set
    pub fn multiple_recipes(&self, name: &str, count: Option<usize>) -> Result<SearchResponse> {
        self.require(name)?;
        let count = self.path_count(count, DEFAULT_PATH_COUNT);
        let started = Instant::now();

        let limit = (count * 2).min(DFS_EXPLORATION_LIMIT);
        let outcome = dfs_backward(&self.graph, name, limit);
        let candidates = forward_order(outcome.paths);

        let mut selected: Vec<RecipePath> = Vec::new();
        let mut anchors_seen = HashSet::new();
        let mut remaining = Vec::new();
        for path in candidates {
            if selected.len() < count && anchors_seen.insert(primitive_anchors(&path)) {
                selected.push(path);
            } else {
                remaining.push(path);
            }
        }

        remaining.sort_by_key(Vec::len);
        let mut element_sets: HashSet<Vec<String>> =
            selected.iter().map(|p| element_set(p)).collect();
        for path in remaining {
            if selected.len() >= count {
                break;
            }
            if element_sets.insert(element_set(&path)) {
                selected.push(path);
            }
        }

        debug!("multiple_recipes({}): {} of {} paths", name, selected.len(), count);
        Ok(SearchResponse {
            paths: selected,
            nodes_visited: outcome.visited,
            time_elapsed: elapsed_ms(started),
        })
    }

    /// Shortest paths first
    pub fn best_recipes(&self, name: &str, count: Option<usize>) -> Result<SearchResponse> {
        self.require(name)?;
        let count = self.path_count(count, DEFAULT_PATH_COUNT);
        let started = Instant::now();

        let limit = (count + 5).min(DFS_EXPLORATION_LIMIT);
        let outcome = dfs_backward(&self.graph, name, limit);
        let mut paths = forward_order(outcome.paths);
        paths.sort_by_key(Vec::len);
        paths.truncate(count);

        Ok(SearchResponse {
            paths,
            nodes_visited: outcome.visited,
            time_elapsed: elapsed_ms(started),
        })
    }

    /// One tree built by the flavor's recipe choice
    pub fn tree(&self, flavor: TreeFlavor, name: &str) -> Result<TreeResponse> {
        self.require(name)?;
        let started = Instant::now();
        let mut builder = TreeBuilder::new(&self.graph, flavor);
        let tree = builder.build(name);

        Ok(TreeResponse {
            tree,
            nodes_visited: builder.visited(),
            time_elapsed: elapsed_ms(started),
        })
    }

    /// One tree per top-level recipe, filled up from search paths
    pub fn best_recipe_trees(
        &self,
        name: &str,
        count: Option<usize>,
        flavor: TreeFlavor,
    ) -> Result<TreesResponse> {
        self.require(name)?;
        let count = self.tree_count(count, DEFAULT_TREE_COUNT);
        let started = Instant::now();
        if let Some(response) = self.primitive_trees(name, started, flavor.as_str()) {
            return Ok(response);
        }

        let mut builder = TreeBuilder::new(&self.graph, flavor);
        let mut trees: Vec<RecipeTree> = Vec::new();
        let mut top_level = HashSet::new();
        let mut signatures = HashSet::new();

        for recipe in self.graph.usable_recipes(name) {
            if trees.len() >= count {
                break;
            }
            let tree = builder.build_with_recipe(name, recipe);
            if top_level.insert(tree.top_level_signature()) {
                signatures.insert(tree.signature());
                trees.push(tree);
            }
        }

        let mut visited = builder.visited();
        if trees.len() < count {
            let outcome = match flavor {
                TreeFlavor::Bfs => {
                    let outcome = bfs_forward(&self.graph, name, count, false);
                    SearchOutcome {
                        paths: forward_order(outcome.paths),
                        visited: outcome.visited,
                    }
                }
                TreeFlavor::Dfs => {
                    dfs_backward(&self.graph, name, (count + 5).min(DFS_EXPLORATION_LIMIT))
                }
            };
            visited += outcome.visited;

            // Paths here are target first
            for path in outcome.paths {
                if trees.len() >= count {
                    break;
                }
                if let Some((tree, nodes)) = tree_from_path(&self.graph, &path, flavor) {
                    visited += nodes;
                    if signatures.insert(tree.signature()) {
                        trees.push(tree);
                    }
                }
            }
        }

        if trees.is_empty() {
            let mut fallback = TreeBuilder::new(&self.graph, flavor);
            trees.push(fallback.build(name));
            visited += fallback.visited();
        }

        Ok(trees_response(trees, visited, started, flavor.as_str()))
    }

    /// Fully expanded distinct trees
    ///
    /// `dfs` runs the enumerator; `bfs` converts parallel forward paths.
    pub async fn multiple_recipe_trees(
        &self,
        name: &str,
        count: Option<usize>,
        flavor: TreeFlavor,
        cancel: CancellationToken,
    ) -> Result<TreesResponse> {
        self.require(name)?;
        let count = self.tree_count(count, DEFAULT_MULTIPLE_TREE_COUNT);
        let started = Instant::now();
        if let Some(response) = self.primitive_trees(name, started, flavor.as_str()) {
            return Ok(response);
        }

        let (trees, visited) = match flavor {
            TreeFlavor::Dfs => {
                let target = name.to_string();
                self.on_blocking_pool(move |graph| {
                    enumerate_trees(graph, &target, count, TreeFlavor::Dfs)
                })
                .await?
            }
            TreeFlavor::Bfs => {
                let outcome =
                    bfs_forward_parallel(Arc::clone(&self.graph), name, count, false, cancel)
                        .await?;
                self.trees_from_paths(name, forward_order(outcome.paths), outcome.visited, count)
            }
        };

        Ok(trees_response(trees, visited, started, flavor.as_str()))
    }

    /// Convert target-first paths into distinct BFS-flavor trees
    fn trees_from_paths(
        &self,
        name: &str,
        paths: Vec<RecipePath>,
        mut visited: usize,
        count: usize,
    ) -> (Vec<RecipeTree>, usize) {
        let mut trees = Vec::new();
        let mut signatures = HashSet::new();
        for path in paths {
            if trees.len() >= count {
                break;
            }
            if let Some((tree, nodes)) = tree_from_path(&self.graph, &path, TreeFlavor::Bfs) {
                visited += nodes;
                if signatures.insert(tree.signature()) {
                    trees.push(tree);
                }
            }
        }

        if trees.is_empty() {
            let mut builder = TreeBuilder::new(&self.graph, TreeFlavor::Bfs);
            trees.push(builder.build(name));
            visited += builder.visited();
        }
        (trees, visited)
    }

    /// BFS-flavor enumeration, optionally one worker per top-level recipe
    pub async fn bfs_trees(
        &self,
        name: &str,
        count: Option<usize>,
        multithreaded: bool,
        cancel: CancellationToken,
    ) -> Result<TreesResponse> {
        self.require(name)?;
        let count = self.tree_count(count, DEFAULT_TREE_COUNT);
        let started = Instant::now();

        let (trees, visited) = if multithreaded {
            enumerate_trees_parallel(Arc::clone(&self.graph), name, count, TreeFlavor::Bfs, cancel)
                .await?
        } else {
            let target = name.to_string();
            self.on_blocking_pool(move |graph| {
                enumerate_trees(graph, &target, count, TreeFlavor::Bfs)
            })
            .await?
        };

        Ok(trees_response(trees, visited, started, TreeFlavor::Bfs.as_str()))
    }

    /// DFS-flavor enumeration; `All` runs up to the safety cap
    pub fn dfs_trees(&self, name: &str, count: Option<CountParam>) -> Result<TreesResponse> {
        self.require(name)?;
        let count = match count {
            Some(CountParam::All) => self.limits.all_trees_cap.max(1),
            Some(CountParam::Limit(n)) => self.tree_count(Some(n), DEFAULT_TREE_COUNT),
            None => self.tree_count(None, DEFAULT_TREE_COUNT),
        };
        let started = Instant::now();

        let (trees, visited) = enumerate_trees(&self.graph, name, count, TreeFlavor::Dfs);
        Ok(trees_response(trees, visited, started, TreeFlavor::Dfs.as_str()))
    }

    /// Bidirectional paths (with meeting points) or trees built from them
    pub async fn bidirectional(
        &self,
        name: &str,
        options: BidirectionalOptions,
        cancel: CancellationToken,
    ) -> Result<BidirectionalResponse> {
        self.require(name)?;
        let count = self.path_count(options.count, 1);
        let started = Instant::now();
        let algorithm = SearchAlgorithm::Bidirectional.as_str();
        if options.tree {
            if let Some(response) = self.primitive_trees(name, started, algorithm) {
                return Ok(BidirectionalResponse::Trees(response));
            }
        }

        let outcome = if options.multithreaded {
            bidirectional_parallel(Arc::clone(&self.graph), name, count, options.single, cancel)
                .await?
        } else {
            let target = name.to_string();
            let single = options.single;
            self.on_blocking_pool(move |graph| bidirectional(graph, &target, count, single))
                .await?
        };

        if options.tree {
            let (trees, visited) =
                self.trees_from_paths(name, forward_order(outcome.paths), outcome.visited, count);
            return Ok(BidirectionalResponse::Trees(trees_response(
                trees, visited, started, algorithm,
            )));
        }

        Ok(BidirectionalResponse::Paths(BidirectionalPathsResponse {
            paths: outcome.paths,
            meeting_points: outcome.meeting_points,
            nodes_visited: outcome.visited,
            time_elapsed: elapsed_ms(started),
        }))
    }

    /// A primitive target answers with its base leaf and one visit
    fn primitive_trees(
        &self,
        name: &str,
        started: Instant,
        algorithm: &str,
    ) -> Option<TreesResponse> {
        is_primitive(name).then(|| {
            let leaf = RecipeTree::base(name, self.graph.image_ref(name));
            trees_response(vec![leaf], 1, started, algorithm)
        })
    }

    /// Run CPU-bound graph work on the blocking pool
    async fn on_blocking_pool<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&ElementGraph) -> T + Send + 'static,
        T: Send + 'static,
    {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || work(&graph))
            .await
            .map_err(|e| Error::InternalSearch(format!("search task failed: {}", e)))
    }

    /// Animation reveals for `name`
    pub fn animation(&self, name: &str, algorithm: SearchAlgorithm) -> Result<AnimationPlan> {
        self.require(name)?;
        Ok(AnimationPlan::build(&self.graph, name, algorithm))
    }
}
