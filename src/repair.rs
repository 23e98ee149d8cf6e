/*
Post-coloring validation and repair.

The conflict graph merges the three origins, so a proper coloring only guarantees
that adjacent entities differ. This pass re-checks the final coloring against the
raw attributes: two entities sharing a color must not share an instructor nor a room.
*/
use std::collections::{BTreeMap, HashSet};

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::color::{Coloring, EntityId, VertexId};
use crate::conflict::ConflictGraph;
use crate::error::{Error, Result};

/** attributes of an entity relevant to the validation */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributes {
    /// instructor teaching the course, if known
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// room of the course, if known
    #[serde(default)]
    pub room_id: Option<String>,
}

impl EntityAttributes {
    /// attributes with an instructor and a room
    pub fn new(instructor_id:Option<&str>, room_id:Option<&str>) -> Self {
        Self {
            instructor_id: instructor_id.map(str::to_string),
            room_id: room_id.map(str::to_string),
        }
    }
}

/// attributes indexed by entity key. Entities absent from it never collide.
pub type AttributeMap = BTreeMap<EntityId, EntityAttributes>;

/** axis on which two entities collide */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationAxis {
    /// same color and same instructor
    Instructor,
    /// same color and same room
    Room,
}

/** two entities sharing a color and an instructor or a room */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// shared color
    pub color: usize,
    /// collision axis
    pub axis: ViolationAxis,
    /// shared instructor or room id
    pub resource: String,
    /// entity seen first (in key order)
    pub first: EntityId,
    /// entity colliding with it
    pub second: EntityId,
}

/** an entity moved to a fresh color */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repair {
    /// moved entity
    pub entity: EntityId,
    /// color before the repair
    pub from: usize,
    /// new (previously unused) color
    pub to: usize,
    /// violation that triggered the repair
    pub violation: Violation,
}

/// tuples (color, resource) already seen along one axis
type SeenSet<'a> = HashSet<(usize, &'a str)>;

/// looks for a collision of vertex v with the entities already scanned
fn find_collision<'a>(
    graph:&ConflictGraph,
    attributes:&'a AttributeMap,
    coloring:&Coloring,
    owners:&BTreeMap<(ViolationAxis, usize, &'a str), VertexId>,
    seen:(&SeenSet<'a>, &SeenSet<'a>),
    v:VertexId,
) -> Option<Violation> {
    let attrs = attributes.get(graph.entity(v))?;
    let color = coloring.color(v);
    let axes = [
        (ViolationAxis::Instructor, attrs.instructor_id.as_deref(), seen.0),
        (ViolationAxis::Room, attrs.room_id.as_deref(), seen.1),
    ];
    for (axis, resource, seen_axis) in axes.iter() {
        let resource = match resource {
            Some(r) => *r,
            None => continue,
        };
        if seen_axis.contains(&(color, resource)) {
            let first = owners.get(&(*axis, color, resource))
                .map(|u| graph.entity(*u).to_string())
                .unwrap_or_default();
            return Some(Violation {
                color,
                axis: *axis,
                resource: resource.to_string(),
                first,
                second: graph.entity(v).to_string(),
            });
        }
    }
    None
}

/** scans the coloring in entity key order, and returns every violation:
an entity whose (color, instructor) or (color, room) tuple was already seen.
Missing attributes never collide.
*/
pub fn validate(graph:&ConflictGraph, attributes:&AttributeMap, coloring:&Coloring) -> Vec<Violation> {
    let mut res = Vec::new();
    let mut instructors:SeenSet = HashSet::new();
    let mut rooms:SeenSet = HashSet::new();
    let mut owners = BTreeMap::new();
    for v in 0..coloring.len() {
        if let Some(violation) = find_collision(
            graph, attributes, coloring, &owners, (&instructors, &rooms), v
        ) {
            res.push(violation);
            continue;
        }
        record(graph, attributes, coloring, v, &mut instructors, &mut rooms, &mut owners);
    }
    res
}

/// registers the tuples of vertex v
fn record<'a>(
    graph:&ConflictGraph,
    attributes:&'a AttributeMap,
    coloring:&Coloring,
    v:VertexId,
    instructors:&mut SeenSet<'a>,
    rooms:&mut SeenSet<'a>,
    owners:&mut BTreeMap<(ViolationAxis, usize, &'a str), VertexId>,
) {
    let attrs = match attributes.get(graph.entity(v)) {
        Some(a) => a,
        None => return,
    };
    let color = coloring.color(v);
    if let Some(i) = attrs.instructor_id.as_deref() {
        instructors.insert((color, i));
        owners.entry((ViolationAxis::Instructor, color, i)).or_insert(v);
    }
    if let Some(r) = attrs.room_id.as_deref() {
        rooms.insert((color, r));
        owners.entry((ViolationAxis::Room, color, r)).or_insert(v);
    }
}

/** repairs the coloring in place. Returns the repairs performed, in order.

Entities are scanned in key order. An entity colliding with an earlier one is moved to
`max color + 1`. As this color is used by no other entity, the tuples scanned so far stay
valid and the scan resumes at the next entity instead of restarting. A final validation
must report no violation.

# Errors
 - `RepairInvariant` if a bump does not produce a fresh color, or if violations remain
*/
pub fn repair(graph:&ConflictGraph, attributes:&AttributeMap, coloring:&mut Coloring) -> Result<Vec<Repair>> {
    let mut repairs = Vec::new();
    let mut instructors:SeenSet = HashSet::new();
    let mut rooms:SeenSet = HashSet::new();
    let mut owners = BTreeMap::new();
    for v in 0..coloring.len() {
        if let Some(violation) = find_collision(
            graph, attributes, coloring, &owners, (&instructors, &rooms), v
        ) {
            let max_color = coloring.max_color().unwrap_or(0);
            let from = coloring.color(v);
            let to = max_color + 1;
            if coloring.colors().contains(&to) {
                return Err(Error::RepairInvariant {
                    entity: graph.entity(v).to_string(),
                    color: to,
                    max_color,
                });
            }
            coloring.set_color(v, to);
            warn!(
                entity = graph.entity(v),
                from, to,
                axis = ?violation.axis,
                resource = %violation.resource,
                "slot collision repaired"
            );
            repairs.push(Repair { entity: graph.entity(v).to_string(), from, to, violation });
        }
        record(graph, attributes, coloring, v, &mut instructors, &mut rooms, &mut owners);
    }
    if let Some(remaining) = validate(graph, attributes, coloring).into_iter().next() {
        return Err(Error::RepairInvariant {
            entity: remaining.second,
            color: remaining.color,
            max_color: coloring.max_color().unwrap_or(0),
        });
    }
    debug!(nb_repairs = repairs.len(), "validation completed");
    Ok(repairs)
}


#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    use crate::color::{checker, CheckerResult};
    use crate::conflict::{ConflictGraphBuilder, ConflictOrigin};
    use crate::search::greedy_dsatur::greedy_dsatur;

    fn attrs(list:&[(&str, Option<&str>, Option<&str>)]) -> AttributeMap {
        list.iter()
            .map(|(e,i,r)| (e.to_string(), EntityAttributes::new(*i, *r)))
            .collect()
    }

    #[test]
    fn test_scenario_c_shared_instructor_without_edge() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_entity("X1").add_entity("X2");
        let g = builder.build();
        let attributes = attrs(&[("X1", Some("D1"), None), ("X2", Some("D1"), None)]);
        let mut coloring = greedy_dsatur(&g);
        assert_eq!(coloring.colors(), &[0,0]);
        let violations = validate(&g, &attributes, &coloring);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].axis, ViolationAxis::Instructor);
        assert_eq!(violations[0].resource, "D1");
        assert_eq!(violations[0].first, "X1");
        assert_eq!(violations[0].second, "X2");
        let repairs = repair(&g, &attributes, &mut coloring).unwrap();
        assert_eq!(repairs.len(), 1);
        assert_eq!(repairs[0].entity, "X2");
        assert_eq!((repairs[0].from, repairs[0].to), (0, 1));
        assert_eq!(coloring.colors(), &[0,1]);
        assert!(validate(&g, &attributes, &coloring).is_empty());
    }

    #[test]
    fn test_room_collision() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_entity("A").add_entity("B").add_entity("C");
        let g = builder.build();
        let attributes = attrs(&[
            ("A", None, Some("R1")),
            ("B", None, Some("R2")),
            ("C", None, Some("R1")),
        ]);
        let mut coloring = Coloring::new(vec![0,0,0]);
        let repairs = repair(&g, &attributes, &mut coloring).unwrap();
        assert_eq!(repairs.len(), 1);
        assert_eq!(repairs[0].violation.axis, ViolationAxis::Room);
        assert_eq!(coloring.colors(), &[0,0,1]);
    }

    #[test]
    fn test_missing_attributes_never_collide() {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_entity("A").add_entity("B").add_entity("C");
        let g = builder.build();
        // B has no attributes at all, C has no instructor
        let attributes = attrs(&[("A", Some("D1"), None), ("C", None, None)]);
        let mut coloring = Coloring::new(vec![0,0,0]);
        assert!(validate(&g, &attributes, &coloring).is_empty());
        assert!(repair(&g, &attributes, &mut coloring).unwrap().is_empty());
        assert_eq!(coloring.colors(), &[0,0,0]);
    }

    #[test]
    fn test_each_bump_uses_a_fresh_color() {
        let mut builder = ConflictGraphBuilder::new();
        for e in ["A", "B", "C", "D"].iter() { builder.add_entity(*e); }
        let g = builder.build();
        let attributes = attrs(&[
            ("A", Some("D1"), Some("R1")),
            ("B", Some("D1"), Some("R1")),
            ("C", Some("D1"), None),
            ("D", None, Some("R1")),
        ]);
        let mut coloring = Coloring::new(vec![0,0,0,0]);
        let repairs = repair(&g, &attributes, &mut coloring).unwrap();
        let targets:Vec<usize> = repairs.iter().map(|r| r.to).collect();
        assert_eq!(targets, vec![1,2,3]);
        assert_eq!(coloring.colors(), &[0,1,2,3]);
    }

    #[test]
    fn test_repair_keeps_the_coloring_proper() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let mut builder = ConflictGraphBuilder::new();
            let mut attributes = AttributeMap::new();
            for i in 0..30 {
                let key = format!("C{:02}", i);
                builder.add_entity(key.clone());
                let instructor = format!("D{}", rng.gen_range(0..6));
                let room = format!("R{}", rng.gen_range(0..8));
                attributes.insert(key, EntityAttributes::new(Some(instructor.as_str()), Some(room.as_str())));
            }
            for i in 0..30 {
                for j in (i+1)..30 {
                    if rng.gen_bool(0.1) {
                        builder.add_conflict(
                            format!("C{:02}", i), format!("C{:02}", j),
                            ConflictOrigin::StudentOverlap,
                        );
                    }
                }
            }
            let g = builder.build();
            let mut coloring = greedy_dsatur(&g);
            repair(&g, &attributes, &mut coloring).unwrap();
            assert!(validate(&g, &attributes, &coloring).is_empty());
            assert!(matches!(checker(&g, &coloring), CheckerResult::Ok(_)));
            // soundness: no two entities share (color, instructor) nor (color, room)
            for u in 0..g.entities().len() {
                for v in (u+1)..g.entities().len() {
                    if coloring.color(u) != coloring.color(v) { continue; }
                    let (a, b) = (&attributes[g.entity(u)], &attributes[g.entity(v)]);
                    assert_ne!(a.instructor_id, b.instructor_id);
                    assert_ne!(a.room_id, b.room_id);
                }
            }
        }
    }

    #[test]
    fn test_empty() {
        let g = ConflictGraphBuilder::new().build();
        let mut coloring = Coloring::default();
        assert!(validate(&g, &AttributeMap::new(), &coloring).is_empty());
        assert!(repair(&g, &AttributeMap::new(), &mut coloring).unwrap().is_empty());
    }
}
