/*
Implements:
 - the conflict origins (shared students, shared instructor, shared room)
 - the conflict graph (simple, undirected, one vertex per entity)
 - the builder merging the three pair sets into a single graph
*/
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bit_set::BitSet;
use serde::{Serialize, Deserialize};
use tracing::info;

use crate::color::{ColoringInstance, EntityId, VertexId};

/** reason why two entities cannot share a slot */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictOrigin {
    /// at least one student takes both courses
    StudentOverlap,
    /// both courses are taught by the same instructor
    InstructorOverlap,
    /// both courses use the same room
    RoomOverlap,
}

impl ConflictOrigin {
    /// all origins, in a fixed order
    pub const ALL: [ConflictOrigin; 3] = [
        ConflictOrigin::StudentOverlap,
        ConflictOrigin::InstructorOverlap,
        ConflictOrigin::RoomOverlap,
    ];
}

impl fmt::Display for ConflictOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictOrigin::StudentOverlap => write!(f, "student-overlap"),
            ConflictOrigin::InstructorOverlap => write!(f, "instructor-overlap"),
            ConflictOrigin::RoomOverlap => write!(f, "room-overlap"),
        }
    }
}


/** models the conflict graph of a term.
Vertices are numbered following the order of the entity keys, so that iterating
over vertex ids visits entities in lexicographic key order.
*/
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    /// entities[v]: key of vertex v (sorted)
    entities: Vec<EntityId>,
    /// nb edges
    m: usize,
    /// edges of the graph (u < v)
    edges: Vec<(VertexId,VertexId)>,
    /// origins[i]: origins that produced edges[i]
    origins: Vec<BTreeSet<ConflictOrigin>>,
    /// adj_list[i]: list of vertices adjacent to i
    adj_list: Vec<Vec<VertexId>>,
    /// if exists: adj_matrix[i] represents a bitset of its neighbors
    adj_matrix: Option<Vec<BitSet>>,
}

impl ColoringInstance for ConflictGraph {
    fn nb_vertices(&self) -> usize { self.entities.len() }

    fn nb_edges(&self) -> usize { self.m }

    fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.adj_list[u] }

    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool {
        match &self.adj_matrix { // if the matrix representation does not exist, iterate over
            None => { self.adj_list[u].iter().any(|c| &v==c) },
            Some(matrix) => { matrix[u].contains(v) } // otherwise, use it
        }
    }

    fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }
}

/** statistics of a conflict graph */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// number of entities
    pub nb_vertices: usize,
    /// number of (deduplicated) conflicts
    pub nb_edges: usize,
    /// smallest degree (0 if empty)
    pub min_degree: usize,
    /// largest degree (0 if empty)
    pub max_degree: usize,
    /// edges produced (at least) by a student overlap
    pub student_edges: usize,
    /// edges produced (at least) by an instructor overlap
    pub instructor_edges: usize,
    /// edges produced (at least) by a room overlap
    pub room_edges: usize,
}

impl ConflictGraph {

    /// key of vertex v
    pub fn entity(&self, v:VertexId) -> &str { &self.entities[v] }

    /// entity keys, indexed by vertex
    pub fn entities(&self) -> &[EntityId] { &self.entities }

    /// vertex of an entity key
    pub fn vertex(&self, entity:&str) -> Option<VertexId> {
        self.entities.binary_search_by(|e| e.as_str().cmp(entity)).ok()
    }

    /// origins of the edge (u,v), empty if u and v are not adjacent
    pub fn edge_origins(&self, u:VertexId, v:VertexId) -> Vec<ConflictOrigin> {
        let key = if u < v { (u,v) } else { (v,u) };
        match self.edges.binary_search(&key) {
            Ok(i) => self.origins[i].iter().copied().collect(),
            Err(_) => vec![],
        }
    }

    /// number of edges produced (at least) by the given origin
    pub fn nb_edges_with_origin(&self, origin:ConflictOrigin) -> usize {
        self.origins.iter().filter(|o| o.contains(&origin)).count()
    }

    /// if called, populate the adj_matrix
    pub fn populate_adj_matrix(&mut self) {
        let mut res = vec![BitSet::default(); self.entities.len()];
        for (a,resa) in res.iter_mut().enumerate() {
            for b in &self.adj_list[a] {
                resa.insert(*b);
            }
        }
        self.adj_matrix = Some(res);
    }

    /// computes the statistics of the graph
    pub fn statistics(&self) -> GraphStats {
        let degrees:Vec<usize> = (0..self.nb_vertices()).map(|i| self.degree(i)).collect();
        GraphStats {
            nb_vertices: self.nb_vertices(),
            nb_edges: self.nb_edges(),
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            student_edges: self.nb_edges_with_origin(ConflictOrigin::StudentOverlap),
            instructor_edges: self.nb_edges_with_origin(ConflictOrigin::InstructorOverlap),
            room_edges: self.nb_edges_with_origin(ConflictOrigin::RoomOverlap),
        }
    }

    /// logs statistics of the graph
    pub fn display_statistics(&self) {
        let stats = self.statistics();
        info!(
            vertices = stats.nb_vertices,
            edges = stats.nb_edges,
            min_degree = stats.min_degree,
            max_degree = stats.max_degree,
            "conflict graph built"
        );
        info!(
            student = stats.student_edges,
            instructor = stats.instructor_edges,
            room = stats.room_edges,
            "conflict edges per origin"
        );
    }
}


/** merges pairwise conflict facts into a conflict graph.
Pairs are canonicalized (smaller key first) so that (A,B) and (B,A) collapse,
duplicates across origins collapse into one edge, self-pairs only add a vertex.
*/
#[derive(Debug, Clone, Default)]
pub struct ConflictGraphBuilder {
    /// known entities
    entities: BTreeSet<EntityId>,
    /// canonical pairs and the origins that produced them
    pairs: BTreeMap<(EntityId,EntityId), BTreeSet<ConflictOrigin>>,
}

impl ConflictGraphBuilder {

    /// creates an empty builder
    pub fn new() -> Self { Self::default() }

    /// builds a graph from the three pair sets at once
    pub fn from_pairs<I1, I2, I3>(students:I1, instructors:I2, rooms:I3) -> ConflictGraph
    where
        I1: IntoIterator<Item=(EntityId,EntityId)>,
        I2: IntoIterator<Item=(EntityId,EntityId)>,
        I3: IntoIterator<Item=(EntityId,EntityId)>,
    {
        let mut builder = Self::new();
        builder.add_conflicts(students, ConflictOrigin::StudentOverlap);
        builder.add_conflicts(instructors, ConflictOrigin::InstructorOverlap);
        builder.add_conflicts(rooms, ConflictOrigin::RoomOverlap);
        builder.build()
    }

    /// adds an entity (idempotent). Useful for entities without any conflict.
    pub fn add_entity(&mut self, entity:impl Into<EntityId>) -> &mut Self {
        self.entities.insert(entity.into());
        self
    }

    /** adds a conflict between a and b (idempotent).
    returns true if the pair was not known yet (whatever its origin).
    */
    pub fn add_conflict(&mut self, a:impl Into<EntityId>, b:impl Into<EntityId>, origin:ConflictOrigin) -> bool {
        let (a, b) = (a.into(), b.into());
        self.entities.insert(a.clone());
        self.entities.insert(b.clone());
        if a == b { return false; } // no self-loops
        let key = if a < b { (a,b) } else { (b,a) };
        let origins = self.pairs.entry(key).or_default();
        let is_new = origins.is_empty();
        origins.insert(origin);
        is_new
    }

    /// adds every pair of an origin
    pub fn add_conflicts<I>(&mut self, pairs:I, origin:ConflictOrigin) -> &mut Self
    where I: IntoIterator<Item=(EntityId,EntityId)> {
        for (a,b) in pairs {
            self.add_conflict(a, b, origin);
        }
        self
    }

    /// number of distinct pairs added so far
    pub fn nb_pairs(&self) -> usize { self.pairs.len() }

    /// builds the conflict graph
    pub fn build(self) -> ConflictGraph {
        let entities:Vec<EntityId> = self.entities.into_iter().collect();
        let index:BTreeMap<&str,VertexId> = entities.iter()
            .enumerate()
            .map(|(i,e)| (e.as_str(), i))
            .collect();
        let mut adj_list = vec![Vec::new() ; entities.len()];
        let mut edges = Vec::with_capacity(self.pairs.len());
        let mut origins = Vec::with_capacity(self.pairs.len());
        for ((a,b), o) in self.pairs {
            // both endpoints were registered in add_conflict
            let (u, v) = match (index.get(a.as_str()), index.get(b.as_str())) {
                (Some(u), Some(v)) => (*u, *v),
                _ => continue,
            };
            adj_list[u].push(v);
            adj_list[v].push(u);
            edges.push((u,v));
            origins.push(o);
        }
        drop(index);
        // pairs are visited in key order, so edges are sorted (u < v as keys are sorted)
        let mut res = ConflictGraph {
            m: edges.len(),
            entities,
            edges,
            origins,
            adj_list,
            adj_matrix: None,
        };
        res.populate_adj_matrix();
        res
    }
}
