use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::calendar::{SlotCalendar, SlotDescriptor};
use crate::color::{ColoringInstance, Coloring, EntityId};
use crate::conflict::ConflictGraph;
use crate::error::{Error, Result};

/** final assignment of an entity: its slot index and time block */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// entity key
    pub entity: EntityId,
    /// color (slot index)
    pub slot: usize,
    /// time block of the slot
    #[serde(flatten)]
    pub descriptor: SlotDescriptor,
}

/** joins a coloring with the slot calendar: one record per entity, in key order.
The calendar is queried once per color in use (never for an empty coloring).
*/
pub fn assemble(graph:&ConflictGraph, coloring:&Coloring, calendar:&SlotCalendar) -> Result<Vec<ScheduleRecord>> {
    assemble_with(graph, coloring, |color| calendar.slot_for(color))
}

/// same as [`assemble`], with any mapping from a color to a time block
pub fn assemble_with<F>(graph:&ConflictGraph, coloring:&Coloring, mut slot_for:F) -> Result<Vec<ScheduleRecord>>
where F: FnMut(usize) -> Result<SlotDescriptor> {
    if coloring.len() != graph.nb_vertices() {
        return Err(Error::ImproperColoring(format!(
            "{} colored entities for {} vertices", coloring.len(), graph.nb_vertices()
        )));
    }
    let mut descriptors:BTreeMap<usize, SlotDescriptor> = BTreeMap::new();
    let mut res = Vec::with_capacity(coloring.len());
    for (v, color) in coloring.colors().iter().enumerate() {
        let descriptor = match descriptors.get(color) {
            Some(d) => *d,
            None => {
                let d = slot_for(*color)?;
                descriptors.insert(*color, d);
                d
            }
        };
        res.push(ScheduleRecord {
            entity: graph.entity(v).to_string(),
            slot: *color,
            descriptor,
        });
    }
    Ok(res)
}

/// groups records by slot index (ascending), records keep their order inside a slot
pub fn slot_map(records:&[ScheduleRecord]) -> BTreeMap<usize, Vec<&ScheduleRecord>> {
    let mut res:BTreeMap<usize, Vec<&ScheduleRecord>> = BTreeMap::new();
    for r in records {
        res.entry(r.slot).or_default().push(r);
    }
    res
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Weekday;

    use crate::calendar::WrapPolicy;
    use crate::conflict::{ConflictGraphBuilder, ConflictOrigin};

    fn triangle() -> ConflictGraph {
        let mut builder = ConflictGraphBuilder::new();
        builder.add_conflict("X1", "X2", ConflictOrigin::StudentOverlap);
        builder.add_conflict("X2", "X3", ConflictOrigin::StudentOverlap);
        builder.add_conflict("X1", "X3", ConflictOrigin::StudentOverlap);
        builder.build()
    }

    #[test]
    fn test_assemble() {
        let g = triangle();
        let calendar = SlotCalendar::from_templates(
            &["Mon 08:00-09:40", "Tue 08:00-09:40"], WrapPolicy::Cycle,
        ).unwrap();
        let records = assemble(&g, &Coloring::new(vec![0,1,2]), &calendar).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].entity, "X1");
        assert_eq!(records[1].descriptor.day, Weekday::Tue);
        assert_eq!(records[2].slot, 2);
        assert_eq!(records[2].descriptor.day, Weekday::Mon);
    }

    #[test]
    fn test_calendar_queried_once_per_color() {
        let g = triangle();
        let calendar = SlotCalendar::weekday_mornings();
        let mut calls = Vec::new();
        assemble_with(&g, &Coloring::new(vec![1,0,1]), |c| {
            calls.push(c);
            calendar.slot_for(c)
        }).unwrap();
        assert_eq!(calls, vec![1,0]);
    }

    #[test]
    fn test_scenario_d_empty() {
        let g = ConflictGraphBuilder::new().build();
        let mut calls = 0;
        let records = assemble_with(&g, &Coloring::default(), |c| {
            calls += 1;
            SlotCalendar::weekday_mornings().slot_for(c)
        }).unwrap();
        assert!(records.is_empty());
        assert_eq!(calls, 0);
        // an empty calendar is fine as long as nothing needs a slot
        let empty = SlotCalendar::new(vec![], WrapPolicy::Cycle);
        assert!(assemble(&g, &Coloring::default(), &empty).unwrap().is_empty());
    }

    #[test]
    fn test_calendar_errors_are_propagated() {
        let g = triangle();
        let empty = SlotCalendar::new(vec![], WrapPolicy::Cycle);
        assert!(matches!(
            assemble(&g, &Coloring::new(vec![0,1,2]), &empty),
            Err(Error::EmptyCalendar)
        ));
        assert!(matches!(
            assemble(&g, &Coloring::new(vec![0,1]), &empty),
            Err(Error::ImproperColoring(_))
        ));
    }

    #[test]
    fn test_slot_map() {
        let g = triangle();
        let records = assemble(&g, &Coloring::new(vec![1,0,1]), &SlotCalendar::default()).unwrap();
        let map = slot_map(&records);
        let slots:Vec<usize> = map.keys().copied().collect();
        assert_eq!(slots, vec![0,1]);
        let in_slot_1:Vec<&str> = map[&1].iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(in_slot_1, vec!["X1", "X3"]);
    }

    #[test]
    fn test_record_json() {
        let g = triangle();
        let records = assemble(&g, &Coloring::new(vec![0,1,2]), &SlotCalendar::default()).unwrap();
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["entity"], "X1");
        assert_eq!(json["slot"], 0);
        assert_eq!(json["day"], "Mon");
        let back:ScheduleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, records[0]);
    }
}
