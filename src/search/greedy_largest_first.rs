use bit_set::BitSet;

use crate::color::{ColoringInstance, Coloring, VertexId};

/** implements a greedy largest-first algorithm.
    1. sort the vertices by decreasing degree (ties: smallest entity key first)
    2. following this order, give each vertex the first color none of its colored neighbors uses

The order is computed once and never updated. Uses at most Δ(G)+1 colors.
*/
pub fn greedy_largest_first(inst:&dyn ColoringInstance) -> Coloring {
    let n:usize = inst.nb_vertices();
    let mut order:Vec<VertexId> = (0..n).collect();
    order.sort_by(|a,b| inst.degree(*b).cmp(&inst.degree(*a)).then_with(|| a.cmp(b)));
    let mut colors:Vec<Option<usize>> = vec![None ; n];
    for v in order {
        let used:BitSet = inst.neighbors(v).iter()
            .filter_map(|u| colors[*u])
            .collect();
        let mut color:usize = 0;
        while used.contains(color) { color += 1; }
        colors[v] = Some(color);
    }
    Coloring::new(colors.into_iter().flatten().collect())
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::color::{checker, CheckerResult};
    use crate::conflict::{ConflictGraphBuilder, ConflictOrigin};

    #[test]
    fn test_star() {
        // the center has the largest degree and is colored first
        let mut builder = ConflictGraphBuilder::new();
        for leaf in ["A", "B", "C"].iter() {
            builder.add_conflict("Z", *leaf, ConflictOrigin::InstructorOverlap);
        }
        let g = builder.build();
        let coloring = greedy_largest_first(&g);
        assert_eq!(coloring.color(g.vertex("Z").unwrap_or(0)), 0);
        assert_eq!(checker(&g, &coloring), CheckerResult::Ok(2));
    }

    #[test]
    fn test_triangle() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("X1", "X2", ConflictOrigin::StudentOverlap);
        builder.add_conflict("X2", "X3", ConflictOrigin::StudentOverlap);
        builder.add_conflict("X3", "X1", ConflictOrigin::StudentOverlap);
        let g = builder.build();
        assert_eq!(greedy_largest_first(&g).colors(), &[0,1,2]);
    }

    #[test]
    fn test_ties_follow_keys() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("B", "A", ConflictOrigin::RoomOverlap);
        builder.add_entity("C");
        let g = builder.build();
        assert_eq!(greedy_largest_first(&g).colors(), &[0,1,0]);
    }
}
