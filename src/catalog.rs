/*
In-memory term catalog: courses (with their instructor and room) and enrollments.
Derives the three conflict pair sets and serves as attribute source.
*/
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use serde::{Serialize, Deserialize};

use crate::color::EntityId;
use crate::engine::{AttributeSource, ConflictPairs, ConflictSource};
use crate::error::{CollaboratorError, Result};
use crate::repair::{AttributeMap, EntityAttributes};

/** a course offering */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// unique course code
    pub code: EntityId,
    /// display name
    #[serde(default)]
    pub name: Option<String>,
    /// instructor teaching the course
    #[serde(default)]
    pub instructor: Option<String>,
    /// room of the course
    #[serde(default)]
    pub room: Option<String>,
}

/** a student taking a course */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// student id
    pub student: String,
    /// course code
    pub course: EntityId,
}

/** courses and enrollments of a term */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCatalog {
    /// courses offered
    #[serde(default)]
    pub courses: Vec<Course>,
    /// enrollments
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

/// every pair (a < b) of distinct members of each group
fn pairs_within(groups:&BTreeMap<&str, BTreeSet<&str>>) -> ConflictPairs {
    let mut res = BTreeSet::new();
    for members in groups.values() {
        let members:Vec<&str> = members.iter().copied().collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i+1..] {
                res.insert((a.to_string(), b.to_string()));
            }
        }
    }
    res.into_iter().collect()
}

impl TermCatalog {
    /// reads a catalog from a JSON file
    pub fn from_file(filename:&str) -> Result<Self> {
        let str = fs::read_to_string(filename)?;
        Ok(serde_json::from_str(&str)?)
    }

    /// adds a course
    pub fn add_course(&mut self, code:&str, instructor:Option<&str>, room:Option<&str>) -> &mut Self {
        self.courses.push(Course {
            code: code.to_string(),
            name: None,
            instructor: instructor.map(str::to_string),
            room: room.map(str::to_string),
        });
        self
    }

    /// enrolls a student in a course
    pub fn enroll(&mut self, student:&str, course:&str) -> &mut Self {
        self.enrollments.push(Enrollment { student: student.to_string(), course: course.to_string() });
        self
    }

    /// course of a given code
    pub fn course(&self, code:&str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }

    /// pairs of courses sharing a student (enrollments may name unknown courses)
    pub fn student_pairs(&self) -> ConflictPairs {
        let mut groups:BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for e in &self.enrollments {
            groups.entry(e.student.as_str()).or_default().insert(e.course.as_str());
        }
        pairs_within(&groups)
    }

    /// pairs of courses sharing an instructor
    pub fn instructor_pairs(&self) -> ConflictPairs {
        self.pairs_by(|c| c.instructor.as_deref())
    }

    /// pairs of courses sharing a room
    pub fn room_pairs(&self) -> ConflictPairs {
        self.pairs_by(|c| c.room.as_deref())
    }

    fn pairs_by<'a, F>(&'a self, key:F) -> ConflictPairs
    where F: Fn(&'a Course) -> Option<&'a str> {
        let mut groups:BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for c in &self.courses {
            if let Some(k) = key(c) {
                groups.entry(k).or_default().insert(c.code.as_str());
            }
        }
        pairs_within(&groups)
    }

    /// attributes of every course
    pub fn attributes(&self) -> AttributeMap {
        self.courses.iter()
            .map(|c| (c.code.clone(), EntityAttributes {
                instructor_id: c.instructor.clone(),
                room_id: c.room.clone(),
            }))
            .collect()
    }
}

impl ConflictSource for TermCatalog {
    fn student_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError> {
        Ok(self.student_pairs())
    }

    fn instructor_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError> {
        Ok(self.instructor_pairs())
    }

    fn room_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError> {
        Ok(self.room_pairs())
    }
}

impl AttributeSource for TermCatalog {
    fn entity_attributes(&self) -> std::result::Result<AttributeMap, CollaboratorError> {
        Ok(self.attributes())
    }
}
