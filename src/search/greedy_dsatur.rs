use std::cmp::{Ordering, Reverse};

use priority_queue::PriorityQueue;
use bit_set::BitSet;
use tracing::debug;

use crate::color::{ColoringInstance, Coloring, VertexId};

/** priority of an uncolored vertex.
The largest saturation wins, then the largest degree, then the smallest vertex id
(vertex ids follow the entity key order, making the choice deterministic).
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
    vertex: Reverse<VertexId>,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat)
            .then_with(|| self.degree.cmp(&other.degree))
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

// `PartialOrd` needs to be implemented as well.
impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/** implements a greedy DSATUR algorithm.
    1. choose an uncolored vertex that sees the most colors (break ties by the largest degree,
       then by the smallest entity key)
    2. give it the first color none of its colored neighbors uses
    3. mark all its uncolored neighbors seeing this color
    4. repeat until every vertex is colored

Terminates after exactly n iterations and uses at most Δ(G)+1 colors.
*/
pub fn greedy_dsatur(inst:&dyn ColoringInstance) -> Coloring {
    let n:usize = inst.nb_vertices();
    let mut remaining_vertices:PriorityQueue<VertexId, DSatInfo> = PriorityQueue::with_capacity(n);
    for i in 0..n {
        remaining_vertices.push(i, DSatInfo { dsat:0, degree:inst.degree(i), vertex:Reverse(i) });
    }
    let mut colors:Vec<Option<usize>> = vec![None ; n]; // colors[v] -> color assigned to vertex v
    let mut adj_colors:Vec<BitSet> = vec![BitSet::default() ; n]; // adj_colors[v] -> colors v sees
    let mut nb_colored:usize = 0;
    while let Some((current_vertex, _)) = remaining_vertices.pop() {
        // first-fit color
        let mut color:usize = 0;
        while adj_colors[current_vertex].contains(color) { color += 1; }
        colors[current_vertex] = Some(color);
        nb_colored += 1;
        if nb_colored % 1000 == 0 { debug!("colored {} / {}...", nb_colored, n); }
        // update saturation degree information
        for conflict_vertex in inst.neighbors(current_vertex).iter()
        .filter(|conflict_vertex| colors[**conflict_vertex].is_none()) {
            if adj_colors[*conflict_vertex].insert(color) { // a new color seen by conflict_vertex
                remaining_vertices.change_priority_by(conflict_vertex, |p| { p.dsat += 1; });
            }
        }
    }
    Coloring::new(colors.into_iter().flatten().collect())
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::color::{checker, CheckerResult};
    use crate::conflict::{ConflictGraphBuilder, ConflictOrigin};

    #[test]
    fn test_scenario_a_single_edge_and_isolated() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_entity("X3");
        builder.add_conflict("X1", "X2", ConflictOrigin::StudentOverlap);
        let g = builder.build();
        let coloring = greedy_dsatur(&g);
        assert_eq!(coloring.colors(), &[0,1,0]);
        assert_eq!(coloring.nb_colors(), 2);
    }

    #[test]
    fn test_scenario_b_triangle() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("X1", "X2", ConflictOrigin::StudentOverlap);
        builder.add_conflict("X2", "X3", ConflictOrigin::InstructorOverlap);
        builder.add_conflict("X1", "X3", ConflictOrigin::RoomOverlap);
        let g = builder.build();
        let coloring = greedy_dsatur(&g);
        assert_eq!(checker(&g, &coloring), CheckerResult::Ok(3));
    }

    #[test]
    fn test_saturation_drives_the_order() {
        // A-B, B-C, C-D, D-A (4-cycle) + E-A: DSATUR colors a 4-cycle with 2 colors
        let mut builder = ConflictGraphBuilder::new();
        for (a,b) in [("A","B"), ("B","C"), ("C","D"), ("D","A"), ("E","A")].iter() {
            builder.add_conflict(*a, *b, ConflictOrigin::StudentOverlap);
        }
        let g = builder.build();
        let coloring = greedy_dsatur(&g);
        assert_eq!(checker(&g, &coloring), CheckerResult::Ok(2));
        assert_eq!(coloring.color(0), 0); // A has the largest degree
    }

    #[test]
    fn test_tie_break_by_key() {
        // no edge at all: every vertex gets color 0
        let mut builder = ConflictGraphBuilder::new();
        builder.add_entity("B").add_entity("A");
        let g = builder.build();
        assert_eq!(greedy_dsatur(&g).colors(), &[0,0]);
        // a single edge: the smallest key is colored first
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("Z", "M", ConflictOrigin::StudentOverlap);
        let g = builder.build();
        assert_eq!(g.entity(0), "M");
        assert_eq!(greedy_dsatur(&g).colors(), &[0,1]);
    }

    #[test]
    fn test_empty() {
        let g = ConflictGraphBuilder::new().build();
        let coloring = greedy_dsatur(&g);
        assert!(coloring.is_empty());
        assert_eq!(coloring.nb_colors(), 0);
    }
}
