//! Road network per color and the longest-road search.
//!
//! Placement legality and road length both need to know who owns the
//! building on a corner. The network itself does not track buildings, so
//! those queries take an `owner_at` lookup supplied by the board.

use crate::layout::{Corner, RoadEdge};
use crate::player::PlayerColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built roads plus an adjacency graph per color.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    built: BTreeMap<RoadEdge, PlayerColor>,
    graphs: BTreeMap<PlayerColor, BTreeMap<Corner, Vec<Corner>>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self, edge: RoadEdge) -> bool {
        self.built.contains_key(&edge)
    }

    pub fn owner(&self, edge: RoadEdge) -> Option<PlayerColor> {
        self.built.get(&edge).copied()
    }

    /// Number of roads on the board
    pub fn len(&self) -> usize {
        self.built.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }

    /// All roads in edge order
    pub fn roads(&self) -> impl Iterator<Item = (RoadEdge, PlayerColor)> + '_ {
        self.built.iter().map(|(edge, color)| (*edge, *color))
    }

    pub fn roads_of(&self, color: PlayerColor) -> Vec<RoadEdge> {
        self.roads()
            .filter(|(_, owner)| *owner == color)
            .map(|(edge, _)| edge)
            .collect()
    }

    /// Whether `color` has a road ending at `corner`
    pub fn has_road_to(&self, color: PlayerColor, corner: Corner) -> bool {
        self.graphs
            .get(&color)
            .is_some_and(|graph| graph.contains_key(&corner))
    }

    /// Corners one road away from `corner` in `color`'s network
    pub fn neighbours(&self, color: PlayerColor, corner: Corner) -> &[Corner] {
        self.graphs
            .get(&color)
            .and_then(|graph| graph.get(&corner))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check whether `color` may build on `edge`.
    ///
    /// One endpoint must carry the player's own building, or be reached by
    /// one of the player's roads without an opponent's building on it.
    /// The caller checks that `edge` lies on the board.
    pub fn can_place<F>(&self, edge: RoadEdge, color: PlayerColor, owner_at: F) -> bool
    where
        F: Fn(Corner) -> Option<PlayerColor>,
    {
        self.can_place_after(edge, color, None, owner_at)
    }

    /// Same as [`RoadNetwork::can_place`], treating `pending` as already
    /// built for `color`. Used to validate two roads laid in one action.
    pub fn can_place_after<F>(
        &self,
        edge: RoadEdge,
        color: PlayerColor,
        pending: Option<RoadEdge>,
        owner_at: F,
    ) -> bool
    where
        F: Fn(Corner) -> Option<PlayerColor>,
    {
        if self.is_built(edge) || pending == Some(edge) {
            return false;
        }

        let reaches = |corner: Corner| {
            self.has_road_to(color, corner) || pending.is_some_and(|p| p.touches(corner))
        };

        edge.endpoints().into_iter().any(|corner| match owner_at(corner) {
            Some(owner) => owner == color,
            None => reaches(corner),
        })
    }

    pub(crate) fn insert(&mut self, edge: RoadEdge, color: PlayerColor) {
        self.built.insert(edge, color);
        let graph = self.graphs.entry(color).or_default();
        let [a, b] = edge.endpoints();
        graph.entry(a).or_default().push(b);
        graph.entry(b).or_default().push(a);
    }

    /// Depth-first search for the corner farthest from `start` along
    /// `color`'s roads. Each path tracks its own visited corners. A corner
    /// holding an opponent's building ends a path: it can be reached, and a
    /// path may start there, but nothing passes through it.
    pub fn farthest_corner<F>(&self, color: PlayerColor, start: Corner, owner_at: F) -> (Corner, u32)
    where
        F: Fn(Corner) -> Option<PlayerColor>,
    {
        let mut best = (start, 0);
        if !self.has_road_to(color, start) {
            return best;
        }

        let mut stack = vec![(start, 0u32, vec![start])];
        while let Some((corner, depth, path)) = stack.pop() {
            if depth > best.1 {
                best = (corner, depth);
            }
            if depth > 0 && owner_at(corner).is_some_and(|owner| owner != color) {
                continue;
            }
            for next in self.neighbours(color, corner) {
                if path.contains(next) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(*next);
                stack.push((*next, depth + 1, extended));
            }
        }

        best
    }

    /// Length of the longest chain through `start`'s component, found with a
    /// double sweep: the farthest corner from `start`, then the farthest
    /// corner from that one.
    pub fn road_length<F>(&self, color: PlayerColor, start: Corner, owner_at: F) -> u32
    where
        F: Fn(Corner) -> Option<PlayerColor>,
    {
        let (far, _) = self.farthest_corner(color, start, &owner_at);
        let (_, length) = self.farthest_corner(color, far, &owner_at);
        length
    }

    /// Best road length over every component `color` has built
    pub fn longest_road<F>(&self, color: PlayerColor, owner_at: F) -> u32
    where
        F: Fn(Corner) -> Option<PlayerColor>,
    {
        let Some(graph) = self.graphs.get(&color) else {
            return 0;
        };
        graph
            .keys()
            .map(|corner| self.road_length(color, *corner, &owner_at))
            .max()
            .unwrap_or(0)
    }
}
