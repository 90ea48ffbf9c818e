use std::{
    collections::VecDeque,
    fmt::{Debug, Display},
    str::FromStr,
};

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::{GridMap, MazeError, Point};

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference is inside the map
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Check if the node can be stepped on
    fn is_passable(&self, node: Self::Reference) -> bool;

    /// Return the in-bounds neighbors of the provided node.
    ///
    /// The order is part of the contract: searches expand neighbors in exactly
    /// this order, which decides between paths of equal length.
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn is_valid(&self, node: Self::Reference) -> bool;
    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// The legal moves out of `node`: in-bounds, not a wall and not yet visited,
/// in the neighbor order of the map.
pub fn adjacent<M, S>(map: &M, node: M::Reference, visited: &S) -> Vec<M::Reference>
where
    M: MapTrait,
    S: MapStorage<bool, Reference = M::Reference>,
{
    map.neighbors_of(node)
        .filter(|&n| !visited.get(n) && map.is_passable(n))
        .collect()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Strategy::BreadthFirst => "bfs",
                Strategy::DepthFirst => "dfs",
            }
        )
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Strategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(Strategy::DepthFirst),
            _ => Err(anyhow::anyhow!("Invalid strategy: {}", s)),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One entry of a partial path: the point and the entry it was reached from.
/// A frontier entry is an index into the arena of these, so extending a path
/// never copies it.
#[derive(Clone, Copy, Debug)]
struct PathNode<R> {
    point: R,
    parent: Option<usize>,
}

/// Queue for breadth-first, stack for depth-first
#[derive(Debug)]
enum Frontier {
    Queue(VecDeque<usize>),
    Stack(Vec<usize>),
}

impl Frontier {
    fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BreadthFirst => Frontier::Queue(VecDeque::new()),
            Strategy::DepthFirst => Frontier::Stack(Vec::new()),
        }
    }

    fn push(&mut self, entry: usize) {
        match self {
            Frontier::Queue(queue) => queue.push_back(entry),
            Frontier::Stack(stack) => stack.push(entry),
        }
    }

    fn pop(&mut self) -> Option<usize> {
        match self {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => stack.pop(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    /// Number of moves, one less than the number of cells in the path
    pub total_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

#[derive(Debug)]
pub struct PathFinder<
    R: NodeReference,
    S: MapStorage<bool, Reference = R>,
    M: MapTrait<Reference = R, Storage<bool> = S>,
> {
    start: R,
    goal: R,
    strategy: Strategy,
    visited: S,
    nodes: Vec<PathNode<R>>,
    frontier: Frontier,
    expanded: usize,
    state: PathFinderState<R>,
    _map: std::marker::PhantomData<M>,
}

impl<
        R: NodeReference,
        S: MapStorage<bool, Reference = R>,
        M: MapTrait<Reference = R, Storage<bool> = S>,
    > PathFinder<R, S, M>
{
    pub fn new(start: R, goal: R, strategy: Strategy, visited: S) -> Self {
        let mut frontier = Frontier::new(strategy);
        frontier.push(0);

        Self {
            start,
            goal,
            strategy,
            visited,
            nodes: vec![PathNode {
                point: start,
                parent: None,
            }],
            frontier,
            expanded: 0,
            state: PathFinderState::Computing,
            _map: std::marker::PhantomData,
        }
    }

    pub fn finish(mut self, map: &M) -> (PathFinderState<R>, S) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.visited),
            }
        }
    }

    /// Take one path off the frontier and either finish or expand it
    pub fn step(&mut self, map: &M) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }

        let Some(entry) = self.frontier.pop() else {
            warn!(
                "{}: frontier exhausted after {} expansions, no path from {:?} to {:?}",
                self.strategy, self.expanded, self.start, self.goal
            );
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        let front = self.nodes[entry].point;

        // the frontier can hold several entries for the same point, only the
        // first one popped is expanded
        if self.visited.get(front) {
            return self.state.clone();
        }

        if front == self.goal {
            let path = self.backtrack(entry);
            debug!(
                "{}: reached {:?} with {} cells after {} expansions",
                self.strategy,
                self.goal,
                path.len(),
                self.expanded
            );

            self.state = PathFinderState::PathFound(PathResult {
                total_cost: path.len() - 1,
                path,
                start: self.start,
                goal: self.goal,
            });
            return self.state.clone();
        }

        *self.visited.get_mut(front) = true;
        self.expanded += 1;

        for point in adjacent(map, front, &self.visited) {
            trace!("{}: {:?} -> {:?}", self.strategy, front, point);
            self.nodes.push(PathNode {
                point,
                parent: Some(entry),
            });
            self.frontier.push(self.nodes.len() - 1);
        }

        self.state.clone()
    }

    /// Walk the parent links from `entry` back to the start
    fn backtrack(&self, entry: usize) -> Vec<R> {
        let mut path = Vec::new();
        let mut current = Some(entry);

        while let Some(index) = current {
            let node = self.nodes[index];
            path.push(node.point);
            current = node.parent;
        }

        path.reverse();
        path
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    pub fn get_visited(&self) -> &S {
        &self.visited
    }

    pub fn start(&self) -> R {
        self.start
    }

    pub fn goal(&self) -> R {
        self.goal
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// How many points have been expanded so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}

/// Run a complete search on a grid maze.
///
/// Fails if either endpoint lies outside the grid or the goal can't be reached.
pub fn find_path(
    map: &GridMap,
    start: Point,
    goal: Point,
    strategy: Strategy,
) -> Result<PathResult<Point>, MazeError> {
    map.cell_at(start)?;
    map.cell_at(goal)?;

    debug!("{}: searching from {} to {}", strategy, start, goal);
    let finder = PathFinder::new(start, goal, strategy, map.create_storage());

    match finder.finish(map).0 {
        PathFinderState::PathFound(result) => Ok(result),
        _ => Err(MazeError::NoPathFound { start, goal }),
    }
}
