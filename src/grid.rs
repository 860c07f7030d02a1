//! Projection of a chosen set of sections onto the week/day/period grid of a term.

use std::fmt::Write;

use classtable_meeting::{Slot, WEEKDAYS};
use thiserror::Error;

use crate::model::{Assignment, Candidate};

const WEEKDAY_NAMES: [&str; WEEKDAYS as usize] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// The extent of a term: weeks are numbered `1..=weeks` and periods `1..=periods`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermShape {
    pub weeks: u8,
    pub periods: u8,
}

impl Default for TermShape {
    fn default() -> Self {
        TermShape {
            weeks: 18,
            periods: 13,
        }
    }
}

impl TermShape {
    pub fn contains(&self, slot: Slot) -> bool {
        (1..=self.weeks).contains(&slot.week)
            && (1..=WEEKDAYS).contains(&slot.weekday)
            && (1..=self.periods).contains(&slot.period)
    }

    fn num_slots(&self) -> usize {
        self.weeks as usize * WEEKDAYS as usize * self.periods as usize
    }

    fn index(&self, slot: Slot) -> Option<usize> {
        if !self.contains(slot) {
            return None;
        }

        let week = slot.week as usize - 1;
        let weekday = slot.weekday as usize - 1;
        let period = slot.period as usize - 1;
        let periods = self.periods as usize;

        Some((week * WEEKDAYS as usize + weekday) * periods + period)
    }
}

/// What occupies a grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub section_id: String,
    pub course_name: String,
    pub instructor: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("sections '{first}' and '{second}' both occupy {slot:?}")]
    Collision {
        slot: Slot,
        first: String,
        second: String,
    },

    #[error("section '{0}' is not a candidate")]
    UnknownSection(String),

    #[error("section '{section}' meets at {slot:?}, outside the term")]
    OutOfRange { section: String, slot: Slot },
}

/// A dense `weeks x 7 x periods` timetable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    shape: TermShape,
    cells: Vec<Option<Placement>>,
}

impl Grid {
    pub fn empty(shape: TermShape) -> Grid {
        Grid {
            shape,
            cells: vec![None; shape.num_slots()],
        }
    }

    /// The placement at `slot`, or `None` if the slot is free or outside the term.
    pub fn get(&self, slot: Slot) -> Option<&Placement> {
        self.shape
            .index(slot)
            .and_then(|idx| self.cells[idx].as_ref())
    }

    /// Every occupied slot of `week`, ordered by weekday and then period.
    pub fn week(&self, week: u8) -> impl Iterator<Item = (Slot, &Placement)> + '_ {
        (1..=WEEKDAYS).flat_map(move |weekday| {
            (1..=self.shape.periods).filter_map(move |period| {
                let slot = Slot {
                    week,
                    weekday,
                    period,
                };

                self.get(slot).map(|placement| (slot, placement))
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Render one week as a text table with a column per weekday and a row per period.
    pub fn render_week(&self, week: u8) -> String {
        let rows = (1..=self.shape.periods)
            .map(|period| {
                let cells = (1..=WEEKDAYS)
                    .map(|weekday| {
                        let slot = Slot {
                            week,
                            weekday,
                            period,
                        };

                        self.get(slot).map(cell_text).unwrap_or_default()
                    })
                    .collect::<Vec<_>>();

                (period, cells)
            })
            .collect::<Vec<_>>();

        let widths = (0..WEEKDAYS as usize)
            .map(|day| {
                rows.iter()
                    .map(|(_, cells)| cells[day].chars().count())
                    .chain([WEEKDAY_NAMES[day].len()])
                    .max()
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        let mut table = String::new();

        write!(table, "{:>4}", format!("W{week}")).unwrap();
        for (name, width) in WEEKDAY_NAMES.iter().zip(&widths) {
            write!(table, " | {}", pad(name, *width)).unwrap();
        }
        table.push('\n');

        for (period, cells) in &rows {
            write!(table, "{period:>4}").unwrap();
            for (cell, width) in cells.iter().zip(&widths) {
                write!(table, " | {}", pad(cell, *width)).unwrap();
            }
            table.push('\n');
        }

        table
    }

    fn place(&mut self, slot: Slot, placement: Placement) -> Result<(), PlacementError> {
        let Some(idx) = self.shape.index(slot) else {
            return Err(PlacementError::OutOfRange {
                section: placement.section_id,
                slot,
            });
        };

        match &self.cells[idx] {
            Some(existing) if existing.section_id != placement.section_id => {
                Err(PlacementError::Collision {
                    slot,
                    first: existing.section_id.clone(),
                    second: placement.section_id,
                })
            }

            _ => {
                self.cells[idx] = Some(placement);
                Ok(())
            }
        }
    }
}

fn cell_text(placement: &Placement) -> String {
    match &placement.instructor {
        Some(instructor) => format!(
            "{} [{}] {instructor}",
            placement.course_name, placement.section_id
        ),
        None => format!("{} [{}]", placement.course_name, placement.section_id),
    }
}

/// Left-align `text` in a field of `width` characters, counting chars rather than bytes.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut padded = text.to_owned();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}

/// Write every section of `assignment` into a fresh grid.
pub fn project(
    shape: TermShape,
    assignment: &Assignment,
    candidates: &[Candidate],
) -> Result<Grid, PlacementError> {
    let mut grid = Grid::empty(shape);

    for id in assignment.iter() {
        let candidate = candidates
            .iter()
            .find(|candidate| candidate.section.id == *id)
            .ok_or_else(|| PlacementError::UnknownSection(id.clone()))?;

        let placement = Placement {
            section_id: candidate.section.id.clone(),
            course_name: candidate.section.course_name.clone(),
            instructor: candidate.section.instructor.clone(),
        };

        for slot in candidate.slots() {
            grid.place(slot, placement.clone())?;
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use classtable_meeting::Meeting;

    use crate::catalog::Section;

    use super::*;

    fn candidate(id: &str, weekday: u8, periods: &[u8]) -> Candidate {
        Candidate {
            course: id[..1].into(),
            section: Section {
                id: id.into(),
                term: "T".into(),
                course_code: id[..1].into(),
                course_name: format!("Course {}", &id[..1]),
                instructor: Some("Ada".into()),
                weeks: "1-2".into(),
                places: String::new(),
                credits: None,
            },
            meetings: vec![Meeting {
                weeks: [1, 2].into(),
                weekday,
                periods: periods.iter().copied().collect(),
                room: "A".into(),
            }],
        }
    }

    fn assignment(ids: &[&str]) -> Assignment {
        ids.iter().map(|&id| id.to_owned()).collect()
    }

    #[test]
    fn chosen_sections_fill_their_slots() {
        let candidates = [candidate("X1", 1, &[1, 2]), candidate("Y1", 3, &[5])];
        let grid = project(
            TermShape::default(),
            &assignment(&["X1", "Y1"]),
            &candidates,
        )
        .expect("no collision");

        let slot = Slot {
            week: 2,
            weekday: 1,
            period: 2,
        };
        let placement = grid.get(slot).expect("occupied");
        assert_eq!("X1", placement.section_id);
        assert_eq!("Course X", placement.course_name);
        assert_eq!(Some("Ada".to_owned()), placement.instructor);

        assert_eq!(3, grid.week(1).count());
        assert_eq!(0, grid.week(3).count());
    }

    #[test]
    fn unchosen_sections_are_not_projected() {
        let candidates = [candidate("X1", 1, &[1]), candidate("X2", 2, &[1])];
        let grid = project(TermShape::default(), &assignment(&["X2"]), &candidates)
            .expect("no collision");

        let monday = Slot {
            week: 1,
            weekday: 1,
            period: 1,
        };
        assert!(grid.get(monday).is_none());
        assert_eq!(1, grid.week(1).count());
    }

    #[test]
    fn overlapping_sections_collide() {
        let candidates = [candidate("X1", 1, &[1, 2]), candidate("Y1", 1, &[2, 3])];
        let result = project(
            TermShape::default(),
            &assignment(&["X1", "Y1"]),
            &candidates,
        );

        assert!(matches!(
            result,
            Err(PlacementError::Collision { slot: Slot { period: 2, .. }, .. })
        ));
    }

    #[test]
    fn unknown_sections_are_reported() {
        let result = project(TermShape::default(), &assignment(&["Z9"]), &[]);

        assert!(matches!(result, Err(PlacementError::UnknownSection(id)) if id == "Z9"));
    }

    #[test]
    fn slots_outside_the_term_are_reported() {
        let shape = TermShape {
            weeks: 18,
            periods: 4,
        };
        let result = project(shape, &assignment(&["X1"]), &[candidate("X1", 1, &[5])]);

        assert!(matches!(result, Err(PlacementError::OutOfRange { .. })));
    }

    #[test]
    fn rendered_week_has_a_row_per_period() {
        let shape = TermShape {
            weeks: 2,
            periods: 3,
        };
        let grid = project(shape, &assignment(&["X1"]), &[candidate("X1", 2, &[2])])
            .expect("no collision");

        let rendered = grid.render_week(1);
        let lines = rendered.lines().collect::<Vec<_>>();

        assert_eq!(4, lines.len());
        assert!(lines[0].contains("Mon") && lines[0].contains("Sun"));
        assert!(lines[2].contains("Course X [X1] Ada"));
        assert!(!lines[1].contains("X1"));

        assert!(grid.render_week(2).contains("X1"));
    }

    #[test]
    fn rendered_cells_omit_a_missing_instructor() {
        let mut unstaffed = candidate("X1", 1, &[1]);
        unstaffed.section.instructor = None;

        let grid = project(TermShape::default(), &assignment(&["X1"]), &[unstaffed])
            .expect("no collision");
        let rendered = grid.render_week(1);

        assert!(rendered.contains("Course X [X1]"));
        assert!(!rendered.contains("Ada"));
    }

    #[test]
    fn empty_assignment_projects_an_empty_grid() {
        let candidates = [candidate("X1", 1, &[1])];

        let empty = project(TermShape::default(), &Assignment::default(), &candidates)
            .expect("nothing to place");
        assert!(empty.is_empty());

        let filled = project(TermShape::default(), &assignment(&["X1"]), &candidates)
            .expect("no collision");
        assert!(!filled.is_empty());
    }
}
