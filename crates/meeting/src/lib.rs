//! Parsing of catalog meeting-time descriptions into occupancy data.
//!
//! A section's meeting time comes as two strings: the weeks it meets (`1-16(单);1-8`) and the
//! places it meets at (`3C102: 1(3,4,5);5104: 3(1,2)`). The i-th week group belongs to the i-th
//! place. Catalog data sometimes lists fewer week groups than places, in which case the week
//! groups are repeated in order until every place has one.

use std::collections::BTreeSet;

use log::warn;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Parser)]
#[grammar = "meeting.pest"]
struct MeetingParser;

/// The number of days in a week. Weekdays are numbered from 1 (Monday) to 7 (Sunday).
pub const WEEKDAYS: u8 = 7;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("week numbers start at 1")]
    ZeroWeek,

    #[error("period numbers start at 1")]
    ZeroPeriod,

    #[error("weekday {0} is outside 1..=7")]
    WeekdayOutOfRange(u8),

    #[error("the week range {start}-{end} is reversed")]
    ReversedRange { start: u8, end: u8 },
}

/// One atomic cell of the timetable.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub week: u8,
    pub weekday: u8,
    pub period: u8,
}

/// A recurring occupancy pattern: the given periods of one weekday, in each of the given weeks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub weeks: BTreeSet<u8>,
    pub weekday: u8,
    pub periods: BTreeSet<u8>,
    pub room: String,
}

impl Meeting {
    /// Every slot this meeting occupies, ordered by week and then period.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.weeks.iter().flat_map(move |&week| {
            self.periods.iter().map(move |&period| Slot {
                week,
                weekday: self.weekday,
                period,
            })
        })
    }
}

/// A parsed place expression, before it is paired with its weeks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Place {
    pub room: String,
    pub weekday: u8,
    pub periods: BTreeSet<u8>,
}

#[derive(Clone, Copy)]
enum Parity {
    Odd,
    Even,
}

/// Parse the week and place descriptions of a section into its meetings.
pub fn parse(raw_weeks: &str, raw_places: &str) -> Result<Vec<Meeting>, MeetingError> {
    let week_groups = parse_weeks(raw_weeks)?;
    let places = parse_places(raw_places)?;

    if places.len() % week_groups.len() != 0 {
        warn!(
            "{} week groups do not divide {} places in '{raw_weeks}' / '{raw_places}', repeating the weeks anyway",
            week_groups.len(),
            places.len(),
        );
    }

    let meetings = places
        .into_iter()
        .zip(week_groups.iter().cycle())
        .map(|(place, weeks)| Meeting {
            weeks: weeks.clone(),
            weekday: place.weekday,
            periods: place.periods,
            room: place.room,
        })
        .collect();

    Ok(meetings)
}

/// Parse a `;`-separated list of week groups into explicit week sets.
pub fn parse_weeks(raw: &str) -> Result<Vec<BTreeSet<u8>>, MeetingError> {
    let weeks = MeetingParser::parse(Rule::weeks, raw)
        .map_err(Box::new)?
        .next()
        .expect("exactly one rule");

    weeks
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::week_group)
        .map(compile_week_group)
        .collect()
}

/// Parse a `;`-separated list of `room:weekday(periods)` expressions.
pub fn parse_places(raw: &str) -> Result<Vec<Place>, MeetingError> {
    let places = MeetingParser::parse(Rule::places, raw)
        .map_err(Box::new)?
        .next()
        .expect("exactly one rule");

    places
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::place)
        .map(compile_place)
        .collect()
}

fn compile_week_group(week_group: Pair<'_, Rule>) -> Result<BTreeSet<u8>, MeetingError> {
    assert_eq!(Rule::week_group, week_group.as_rule());

    let mut weeks = BTreeSet::new();
    for week_item in week_group.into_inner() {
        compile_week_item(week_item, &mut weeks)?;
    }

    Ok(weeks)
}

fn compile_week_item(
    week_item: Pair<'_, Rule>,
    weeks: &mut BTreeSet<u8>,
) -> Result<(), MeetingError> {
    assert_eq!(Rule::week_item, week_item.as_rule());

    let mut bounds = Vec::with_capacity(2);
    let mut parity = None;

    for component in week_item.into_inner() {
        match component.as_rule() {
            Rule::number => bounds.push(compile_number(component)?),
            Rule::parity => parity = Some(compile_parity(component)),
            _ => unreachable!(),
        }
    }

    if bounds.contains(&0) {
        return Err(MeetingError::ZeroWeek);
    }

    match bounds[..] {
        [week] => {
            weeks.insert(week);
        }

        [start, end] => {
            if start > end {
                return Err(MeetingError::ReversedRange { start, end });
            }

            weeks.extend((start..=end).filter(|week| match parity {
                Some(Parity::Odd) => week % 2 == 1,
                Some(Parity::Even) => week % 2 == 0,
                None => true,
            }));
        }

        _ => unreachable!("the grammar allows one or two numbers"),
    }

    Ok(())
}

fn compile_parity(parity: Pair<'_, Rule>) -> Parity {
    assert_eq!(Rule::parity, parity.as_rule());

    let inner = parity.into_inner().next().expect("missing parity marker");
    match inner.as_rule() {
        Rule::odd => Parity::Odd,
        Rule::even => Parity::Even,
        _ => unreachable!(),
    }
}

fn compile_place(place: Pair<'_, Rule>) -> Result<Place, MeetingError> {
    assert_eq!(Rule::place, place.as_rule());

    let mut components = place.into_inner();

    let room_rule = components.next().expect("missing room rule");
    let weekday_rule = components.next().expect("missing weekday rule");
    let periods_rule = components.next().expect("missing periods rule");

    assert_eq!(Rule::room, room_rule.as_rule());

    let weekday = compile_number(weekday_rule)?;
    if !(1..=WEEKDAYS).contains(&weekday) {
        return Err(MeetingError::WeekdayOutOfRange(weekday));
    }

    let periods = compile_periods(periods_rule)?;

    Ok(Place {
        room: room_rule.as_str().trim().to_owned(),
        weekday,
        periods,
    })
}

fn compile_periods(periods: Pair<'_, Rule>) -> Result<BTreeSet<u8>, MeetingError> {
    assert_eq!(Rule::periods, periods.as_rule());

    let periods = periods
        .into_inner()
        .map(compile_number)
        .collect::<Result<BTreeSet<_>, _>>()?;

    if periods.contains(&0) {
        return Err(MeetingError::ZeroPeriod);
    }

    Ok(periods)
}

fn compile_number(number: Pair<'_, Rule>) -> Result<u8, MeetingError> {
    assert_eq!(Rule::number, number.as_rule());

    number
        .as_str()
        .parse()
        .map_err(|_| MeetingError::InvalidNumber(number.as_str().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_cover_every_week_and_period() {
        let meeting = Meeting {
            weeks: [1, 2].into(),
            weekday: 3,
            periods: [4, 5].into(),
            room: "5104".into(),
        };

        let slots = meeting.slots().collect::<Vec<_>>();

        assert_eq!(4, slots.len());
        assert_eq!(
            Slot {
                week: 1,
                weekday: 3,
                period: 4
            },
            slots[0]
        );
        assert_eq!(
            Slot {
                week: 2,
                weekday: 3,
                period: 5
            },
            slots[3]
        );
    }
}
