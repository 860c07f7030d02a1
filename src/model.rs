//! Translation of a scheduling request into boolean constraints over section variables.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::{self, Display},
};

use classtable_core::storage::Indexer;
use classtable_meeting::{Meeting, MeetingError, Slot};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{catalog::Section, grid::TermShape};

/// The decision variable that is true when its section is chosen.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionVar(u32);

impl Indexer for SectionVar {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The set of chosen sections, one per requested course.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    ids: BTreeSet<String>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> + '_ {
        self.ids.iter()
    }
}

impl FromIterator<String> for Assignment {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Assignment {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Assignment {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, id) in self.ids.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

/// Restricts which sections of a course may be chosen: one of `preferred` must be taken, and none
/// of `excluded`. An empty `preferred` set only excludes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceGroup {
    pub course: String,
    pub preferred: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
}

impl PreferenceGroup {
    /// Prefer `preferred` and exclude every other section in `all_sections`.
    pub fn prefer<'a>(
        course: impl Into<String>,
        preferred: impl IntoIterator<Item = &'a str>,
        all_sections: impl IntoIterator<Item = &'a str>,
    ) -> PreferenceGroup {
        let preferred = preferred
            .into_iter()
            .map(str::to_owned)
            .collect::<BTreeSet<_>>();
        let excluded = all_sections
            .into_iter()
            .filter(|id| !preferred.contains(*id))
            .map(str::to_owned)
            .collect();

        PreferenceGroup {
            course: course.into(),
            preferred,
            excluded,
        }
    }
}

/// A section together with its parsed meetings.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// The requested course code the section was fetched for.
    pub course: String,
    pub section: Section,
    pub meetings: Vec<Meeting>,
}

impl Candidate {
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.meetings.iter().flat_map(Meeting::slots)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// No two of the sections share a slot.
    AtMostOne(Vec<SectionVar>),
    /// Exactly one section of a course is chosen.
    ExactlyOne(Vec<SectionVar>),
    /// A previously produced assignment is not produced again.
    NotAll(Vec<SectionVar>),
    /// One of the preferred sections is chosen.
    AtLeastOne(Vec<SectionVar>),
    Forbidden(SectionVar),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("course '{0}' has no candidate sections")]
    NoCandidates(String),

    #[error("section '{section}' has a malformed meeting time")]
    Meeting {
        section: String,
        #[source]
        source: MeetingError,
    },

    #[error("section '{section}' meets at {slot:?}, outside the term")]
    OutsideTerm { section: String, slot: Slot },

    #[error("section '{0}' is listed twice")]
    DuplicateSection(String),

    #[error("section '{section}' is not a candidate of course '{course}'")]
    UnknownSection { course: String, section: String },
}

/// The number of constraints per family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub sections: usize,
    pub at_most_one: usize,
    pub exactly_one: usize,
    pub not_all: usize,
    pub at_least_one: usize,
    pub forbidden: usize,
}

impl Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sections, {} at-most-one, {} exactly-one, {} not-all, {} at-least-one, {} forbidden",
            self.sections,
            self.at_most_one,
            self.exactly_one,
            self.not_all,
            self.at_least_one,
            self.forbidden,
        )
    }
}

/// The constraints of one solve, over one variable per candidate section.
#[derive(Clone, Debug)]
pub struct ConstraintModel {
    candidates: Vec<Candidate>,
    ids: HashMap<String, SectionVar>,
    constraints: Vec<Constraint>,
}

impl ConstraintModel {
    pub fn num_vars(&self) -> usize {
        self.candidates.len()
    }

    pub fn vars(&self) -> impl Iterator<Item = SectionVar> {
        (0..self.candidates.len() as u32).map(SectionVar)
    }

    pub fn var(&self, section_id: &str) -> Option<SectionVar> {
        self.ids.get(section_id).copied()
    }

    pub fn candidate(&self, var: SectionVar) -> &Candidate {
        &self.candidates[var.index()]
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Read back the chosen sections from the values of the section variables.
    pub fn assignment(&self, is_chosen: impl Fn(SectionVar) -> bool) -> Assignment {
        self.vars()
            .filter(|&var| is_chosen(var))
            .map(|var| self.candidate(var).section.id.clone())
            .collect()
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            sections: self.candidates.len(),
            ..ModelStats::default()
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::AtMostOne(_) => stats.at_most_one += 1,
                Constraint::ExactlyOne(_) => stats.exactly_one += 1,
                Constraint::NotAll(_) => stats.not_all += 1,
                Constraint::AtLeastOne(_) => stats.at_least_one += 1,
                Constraint::Forbidden(_) => stats.forbidden += 1,
            }
        }

        stats
    }
}

pub struct ModelBuilder {
    shape: TermShape,
}

impl ModelBuilder {
    pub fn new(shape: TermShape) -> ModelBuilder {
        ModelBuilder { shape }
    }

    /// Build the model for `requested`, taking the sections of each course from `candidates`
    /// under its requested code. Entries of courses that are not requested are ignored.
    pub fn build(
        &self,
        requested: &[String],
        candidates: &HashMap<String, Vec<Section>>,
        history: &[Assignment],
        preferences: &[PreferenceGroup],
    ) -> Result<ConstraintModel, ModelError> {
        let mut seen = HashSet::new();
        let requested = requested
            .iter()
            .filter(|course| seen.insert(course.as_str()))
            .collect::<Vec<_>>();

        let mut model = ConstraintModel {
            candidates: vec![],
            ids: HashMap::new(),
            constraints: vec![],
        };

        let mut course_vars = Vec::with_capacity(requested.len());
        for course in &requested {
            let sections = candidates.get(course.as_str()).map(Vec::as_slice);
            let vars = self.add_course(&mut model, course, sections.unwrap_or_default())?;
            course_vars.push(vars);
        }

        self.post_slot_exclusivity(&mut model);

        model
            .constraints
            .extend(course_vars.into_iter().map(Constraint::ExactlyOne));

        for assignment in history {
            post_history(&mut model, assignment);
        }

        for group in preferences {
            if requested.iter().any(|course| **course == group.course) {
                post_preference(&mut model, group)?;
            } else {
                debug!(
                    "skipping preferences of '{}', which is not requested",
                    group.course
                );
            }
        }

        info!("built model: {}", model.stats());

        Ok(model)
    }

    fn add_course(
        &self,
        model: &mut ConstraintModel,
        course: &str,
        sections: &[Section],
    ) -> Result<Vec<SectionVar>, ModelError> {
        let mut vars = vec![];

        for section in sections {
            if model.ids.contains_key(&section.id) {
                return Err(ModelError::DuplicateSection(section.id.clone()));
            }

            let meetings = classtable_meeting::parse(&section.weeks, &section.places).map_err(
                |source| ModelError::Meeting {
                    section: section.id.clone(),
                    source,
                },
            )?;

            let candidate = Candidate {
                course: course.to_owned(),
                section: section.clone(),
                meetings,
            };

            if let Some(slot) = candidate.slots().find(|&slot| !self.shape.contains(slot)) {
                return Err(ModelError::OutsideTerm {
                    section: section.id.clone(),
                    slot,
                });
            }

            let var = SectionVar(model.candidates.len() as u32);
            model.ids.insert(section.id.clone(), var);
            model.candidates.push(candidate);
            vars.push(var);
        }

        if vars.is_empty() {
            return Err(ModelError::NoCandidates(course.to_owned()));
        }

        Ok(vars)
    }

    fn post_slot_exclusivity(&self, model: &mut ConstraintModel) {
        let mut occupants: BTreeMap<Slot, Vec<SectionVar>> = BTreeMap::new();

        for var in model.vars() {
            for slot in model.candidate(var).slots() {
                let vars = occupants.entry(slot).or_default();

                // A section may list the same slot in two of its meetings.
                if vars.last() != Some(&var) {
                    vars.push(var);
                }
            }
        }

        let groups = occupants
            .into_values()
            .filter(|vars| vars.len() > 1)
            .collect::<BTreeSet<_>>();

        model
            .constraints
            .extend(groups.into_iter().map(Constraint::AtMostOne));
    }
}

fn post_history(model: &mut ConstraintModel, assignment: &Assignment) {
    let vars = assignment
        .iter()
        .map(|id| model.var(id))
        .collect::<Option<Vec<_>>>();

    match vars {
        Some(vars) => model.constraints.push(Constraint::NotAll(vars)),
        None => debug!("skipping history entry {assignment}, it can no longer be produced"),
    }
}

fn post_preference(model: &mut ConstraintModel, group: &PreferenceGroup) -> Result<(), ModelError> {
    let lookup = |id: &String| {
        model
            .var(id)
            .filter(|&var| model.candidate(var).course == group.course)
            .ok_or_else(|| ModelError::UnknownSection {
                course: group.course.clone(),
                section: id.clone(),
            })
    };

    let preferred = group
        .preferred
        .iter()
        .map(lookup)
        .collect::<Result<Vec<_>, _>>()?;
    let excluded = group
        .excluded
        .iter()
        .map(lookup)
        .collect::<Result<Vec<_>, _>>()?;

    if !preferred.is_empty() {
        model.constraints.push(Constraint::AtLeastOne(preferred));
    }

    model
        .constraints
        .extend(excluded.into_iter().map(Constraint::Forbidden));

    Ok(())
}
