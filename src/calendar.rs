//! Slot calendar: maps a color index to a concrete time block.
//!
//! The calendar is an ordered list of templates (`"Mon 08:00-09:40"`).
//! Color `i` uses template `i mod L`. What happens once every template has been
//! used is decided by an explicit [`WrapPolicy`]:
//! - `cycle`: the templates are reused as is (several colors share a time block)
//! - `stack`: cycle `k = i / L` is shifted `k * shift_minutes` later in the day

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Weekday};
use nom::IResult;
use nom::character::complete::{alpha1, char, digit1, space0, space1};
use nom::combinator::{all_consuming, map_opt, map_res};
use nom::sequence::{delimited, separated_pair, tuple};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/** concrete time block of a slot */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotDescriptor {
    /// day of the week
    pub day: Weekday,
    /// start time (inclusive)
    pub start: NaiveTime,
    /// end time (exclusive)
    pub end: NaiveTime,
}

impl fmt::Display for SlotDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}


/** one entry of the calendar. Serialized as `"Mon 08:00-09:40"`. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTemplate {
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
}

impl SlotTemplate {
    /// creates a template, start must be before end
    pub fn new(day:Weekday, start:NaiveTime, end:NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidTemplate(format!(
                "{} {}: start is not before end {}", day, start.format("%H:%M"), end.format("%H:%M")
            )));
        }
        Ok(Self { day, start, end })
    }

    /// day of the template
    pub fn day(&self) -> Weekday { self.day }

    /// time block of the template
    pub fn descriptor(&self) -> SlotDescriptor {
        SlotDescriptor { day: self.day, start: self.start, end: self.end }
    }
}

impl fmt::Display for SlotTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor(), f)
    }
}

/// reads a day name ("Mon", "monday", ...)
fn parse_day(s:&str) -> IResult<&str, Weekday> {
    map_res(alpha1, Weekday::from_str)(s)
}

/// reads a "HH:MM" time
fn parse_time(s:&str) -> IResult<&str, NaiveTime> {
    map_opt(
        separated_pair(digit1, char(':'), digit1),
        |(h, m):(&str, &str)| NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0),
    )(s)
}

/// reads "DAY HH:MM-HH:MM"
fn parse_template(s:&str) -> IResult<&str, (Weekday, NaiveTime, NaiveTime)> {
    let (remaining, (day, _, start, _, end)) = tuple((
        parse_day,
        space1,
        parse_time,
        delimited(space0, char('-'), space0),
        parse_time,
    ))(s)?;
    Ok((remaining, (day, start, end)))
}

impl FromStr for SlotTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match all_consuming(parse_template)(s.trim()) {
            Ok((_, (day, start, end))) => Self::new(day, start, end),
            Err(e) => Err(Error::InvalidTemplate(format!("{:?}: {}", s, e))),
        }
    }
}

impl TryFrom<String> for SlotTemplate {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<SlotTemplate> for String {
    fn from(t: SlotTemplate) -> String { t.to_string() }
}


/** what happens to colors beyond the number of templates */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WrapPolicy {
    /// color i uses template i mod L unchanged
    Cycle,
    /// color i uses template i mod L, shifted by (i / L) * shift_minutes
    Stack {
        /// shift between two consecutive cycles
        shift_minutes: u32,
    },
}

impl Default for WrapPolicy {
    fn default() -> Self { WrapPolicy::Cycle }
}


/** ordered list of slot templates + wraparound policy */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCalendar {
    templates: Vec<SlotTemplate>,
    #[serde(default)]
    policy: WrapPolicy,
}

/// builds a constant time
fn hm(hour:u32, min:u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or_default()
}

impl Default for SlotCalendar {
    fn default() -> Self { Self::weekday_mornings() }
}

impl SlotCalendar {
    /// creates a calendar
    pub fn new(templates:Vec<SlotTemplate>, policy:WrapPolicy) -> Self {
        Self { templates, policy }
    }

    /// creates a calendar from template strings ("Mon 08:00-09:40")
    pub fn from_templates(templates:&[&str], policy:WrapPolicy) -> Result<Self> {
        let templates = templates.iter()
            .map(|t| t.parse())
            .collect::<Result<Vec<SlotTemplate>>>()?;
        Ok(Self::new(templates, policy))
    }

    /// Monday to Friday, 08:00-09:40, reused cyclically
    pub fn weekday_mornings() -> Self {
        Self::morning_block(
            &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            WrapPolicy::Cycle,
        )
    }

    /// Monday to Saturday, 08:00-09:40, each further cycle two hours later
    pub fn six_day_stacked() -> Self {
        Self::morning_block(
            &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat],
            WrapPolicy::Stack { shift_minutes: 120 },
        )
    }

    fn morning_block(days:&[Weekday], policy:WrapPolicy) -> Self {
        let templates = days.iter()
            .map(|day| SlotTemplate { day: *day, start: hm(8, 0), end: hm(9, 40) })
            .collect();
        Self::new(templates, policy)
    }

    /// number of templates
    pub fn len(&self) -> usize { self.templates.len() }

    /// true if the calendar has no template
    pub fn is_empty(&self) -> bool { self.templates.is_empty() }

    /// templates, in order
    pub fn templates(&self) -> &[SlotTemplate] { &self.templates }

    /// wraparound policy
    pub fn policy(&self) -> WrapPolicy { self.policy }

    /// time block of a color
    pub fn slot_for(&self, color:usize) -> Result<SlotDescriptor> {
        if self.templates.is_empty() {
            return Err(Error::EmptyCalendar);
        }
        let template = &self.templates[color % self.templates.len()];
        match self.policy {
            WrapPolicy::Cycle => Ok(template.descriptor()),
            WrapPolicy::Stack { shift_minutes } => {
                let cycle = color / self.templates.len();
                let overflow = Error::CalendarOverflow { color };
                let minutes = i64::try_from(cycle).ok()
                    .and_then(|c| c.checked_mul(i64::from(shift_minutes)))
                    .filter(|m| *m < 24 * 60);
                let shift = match minutes {
                    Some(m) => Duration::minutes(m),
                    None => return Err(overflow),
                };
                let (start, wrapped_start) = template.start.overflowing_add_signed(shift);
                let (end, wrapped_end) = template.end.overflowing_add_signed(shift);
                if wrapped_start != 0 || wrapped_end != 0 {
                    return Err(overflow);
                }
                Ok(SlotDescriptor { day: template.day, start, end })
            }
        }
    }
}
