/** Vertex Id (position of an entity in the conflict graph) */
pub type VertexId = usize;

/** Entity key (course offering code) */
pub type EntityId = String;

/** Solution of a graph coloring problem
(represented as a partition: solution[c] lists the vertices of color c).
*/
pub type Solution = Vec<Vec<VertexId>>;

/** base trait of a graph coloring instance */
pub trait ColoringInstance {
    /// number of vertices
    fn nb_vertices(&self) -> usize;

    /// number of edges
    fn nb_edges(&self) -> usize;

    /// vertices adjacent to u
    fn neighbors(&self, u:VertexId) -> &[VertexId];

    /// number of vertices adjacent to u
    fn degree(&self, u:VertexId) -> usize { self.neighbors(u).len() }

    /// true iff u and v are adjacent
    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool;

    /// edge list (each edge once, smaller endpoint first)
    fn edges(&self) -> &[(VertexId,VertexId)];

    /// largest degree of the graph (0 if the graph is empty)
    fn max_degree(&self) -> usize {
        (0..self.nb_vertices()).map(|u| self.degree(u)).max().unwrap_or(0)
    }
}


/** Coloring: color[v] is the color (slot index) of vertex v */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coloring {
    colors: Vec<usize>,
}

impl Coloring {
    /// creates a coloring from the color of each vertex
    pub fn new(colors:Vec<usize>) -> Self { Self { colors } }

    /// number of colored vertices
    pub fn len(&self) -> usize { self.colors.len() }

    /// true if no vertex is colored
    pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    /// color of vertex v
    pub fn color(&self, v:VertexId) -> usize { self.colors[v] }

    /// sets the color of vertex v
    pub fn set_color(&mut self, v:VertexId, color:usize) { self.colors[v] = color; }

    /// colors indexed by vertex
    pub fn colors(&self) -> &[usize] { &self.colors }

    /// largest color in use
    pub fn max_color(&self) -> Option<usize> { self.colors.iter().copied().max() }

    /// chromatic count: max(color)+1, or 0 for an empty coloring
    pub fn nb_colors(&self) -> usize {
        self.max_color().map_or(0, |c| c+1)
    }

    /// partition view of the coloring (one list of vertices per color)
    pub fn to_solution(&self) -> Solution {
        let mut res = vec![vec![] ; self.nb_colors()];
        for (v,c) in self.colors.iter().enumerate() {
            res[*c].push(v);
        }
        res
    }
}


/** result of the checker */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerResult {
    /// the coloring is proper, with the given number of colors
    Ok(usize),
    /// a vertex of the graph has no color
    VertexNotColored(VertexId),
    /// the coloring refers to a vertex outside of the graph
    UnknownVertex(VertexId),
    /// both endpoints of an edge share a color
    ConflictingEdge(VertexId, VertexId),
}

/**
checks that a coloring is complete and proper.
returns the number of colors if so.
*/
pub fn checker(inst:&dyn ColoringInstance, coloring:&Coloring) -> CheckerResult {
    let n = inst.nb_vertices();
    if coloring.len() < n {
        return CheckerResult::VertexNotColored(coloring.len());
    }
    if coloring.len() > n {
        return CheckerResult::UnknownVertex(n);
    }
    for (a,b) in inst.edges() {
        if coloring.color(*a) == coloring.color(*b) {
            return CheckerResult::ConflictingEdge(*a, *b);
        }
    }
    CheckerResult::Ok(coloring.nb_colors())
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::conflict::{ConflictGraphBuilder, ConflictOrigin};

    fn path3() -> crate::conflict::ConflictGraph {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("A", "B", ConflictOrigin::StudentOverlap);
        builder.add_conflict("B", "C", ConflictOrigin::StudentOverlap);
        builder.build()
    }

    #[test]
    fn test_nb_colors() {
        assert_eq!(Coloring::default().nb_colors(), 0);
        assert_eq!(Coloring::new(vec![0,2,1]).nb_colors(), 3);
        assert_eq!(Coloring::new(vec![0,0]).to_solution(), vec![vec![0,1]]);
    }

    #[test]
    fn test_checker_ok() {
        let inst = path3();
        assert_eq!(checker(&inst, &Coloring::new(vec![0,1,0])), CheckerResult::Ok(2));
    }

    #[test]
    fn test_checker_conflict() {
        let inst = path3();
        assert_eq!(
            checker(&inst, &Coloring::new(vec![0,1,1])),
            CheckerResult::ConflictingEdge(1,2)
        );
    }

    #[test]
    fn test_checker_incomplete() {
        let inst = path3();
        assert_eq!(checker(&inst, &Coloring::new(vec![0,1])), CheckerResult::VertexNotColored(2));
        assert_eq!(checker(&inst, &Coloring::new(vec![0,1,0,0])), CheckerResult::UnknownVertex(3));
    }
}
