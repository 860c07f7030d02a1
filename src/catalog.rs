//! The seam to the course catalog.

use std::{collections::HashMap, fs::File, io::BufReader, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ClasstableError;

/// One offering of a course in a term, as listed in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub term: String,
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub instructor: Option<String>,
    /// The raw week expression, e.g. `1-16(单)`.
    pub weeks: String,
    /// The raw place expression, e.g. `3C102: 1(3,4,5)`.
    pub places: String,
    #[serde(default)]
    pub credits: Option<f32>,
}

pub trait CatalogProvider {
    /// All sections of `course` offered in `term`. Unknown courses yield an empty list.
    fn fetch_candidates(&self, term: &str, course: &str) -> Vec<Section>;
}

impl<C: CatalogProvider + ?Sized> CatalogProvider for &C {
    fn fetch_candidates(&self, term: &str, course: &str) -> Vec<Section> {
        (**self).fetch_candidates(term, course)
    }
}

impl<C: CatalogProvider + ?Sized> CatalogProvider for Box<C> {
    fn fetch_candidates(&self, term: &str, course: &str) -> Vec<Section> {
        (**self).fetch_candidates(term, course)
    }
}

/// A catalog held in memory, indexed by term and course code. Sections keep their listing order.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    sections: HashMap<(String, String), Vec<Section>>,
}

impl MemoryCatalog {
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn insert(&mut self, section: Section) {
        self.sections
            .entry((section.term.clone(), section.course_code.clone()))
            .or_default()
            .push(section);
    }
}

impl FromIterator<Section> for MemoryCatalog {
    fn from_iter<T: IntoIterator<Item = Section>>(iter: T) -> Self {
        let mut catalog = MemoryCatalog::default();
        for section in iter {
            catalog.insert(section);
        }

        catalog
    }
}

impl CatalogProvider for MemoryCatalog {
    fn fetch_candidates(&self, term: &str, course: &str) -> Vec<Section> {
        self.sections
            .get(&(term.to_owned(), course.to_owned()))
            .cloned()
            .unwrap_or_default()
    }
}

/// A catalog read from a JSON array of sections.
#[derive(Clone, Debug)]
pub struct JsonCatalog {
    inner: MemoryCatalog,
}

impl JsonCatalog {
    pub fn open(path: impl AsRef<Path>) -> Result<JsonCatalog, ClasstableError> {
        let file = File::open(path)?;
        JsonCatalog::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<JsonCatalog, ClasstableError> {
        let sections: Vec<Section> = serde_json::from_reader(reader)?;
        log::debug!("loaded {} catalog sections", sections.len());

        Ok(JsonCatalog {
            inner: sections.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CatalogProvider for JsonCatalog {
    fn fetch_candidates(&self, term: &str, course: &str) -> Vec<Section> {
        self.inner.fetch_candidates(term, course)
    }
}
