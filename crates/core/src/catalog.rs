//! Course Catalog
//!
//! This module loads the curriculum (courses, their ordered modules and the
//! static teaching content of each module) once at startup and answers
//! read-only lookups for the tutor. Malformed data is rejected while loading,
//! so every lookup afterwards works on validated, strongly-typed records.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised while loading the catalog. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read course catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Course catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Course catalog contains a course with a blank name")]
    BlankCourseName,
    #[error("Course '{0}' is defined more than once (course names ignore case)")]
    DuplicateCourse(String),
    #[error("Course '{0}' has no modules")]
    EmptyCourse(String),
    #[error("Course '{course}' defines module {module_id} more than once")]
    DuplicateModule { course: String, module_id: u32 },
}

/// One unit of curriculum content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Module {
    #[serde(rename = "Module")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Content")]
    pub content: String,
}

/// An ordered sequence of modules under a unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub name: String,
    pub modules: Vec<Module>,
}

impl Course {
    /// Returns the module at the given position in curriculum order.
    pub fn module_at(&self, index: usize) -> Option<&Module> {
        self.modules.get(index)
    }

    /// Returns the module with the given id.
    pub fn module(&self, module_id: u32) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }
}

// On-disk shape: { "Course": { "<name>": [ { "Module", "Name", "Content" } ] } }
#[derive(Deserialize)]
struct RawCatalog {
    #[serde(rename = "Course", deserialize_with = "course_entries")]
    courses: Vec<(String, serde_json::Value)>,
}

// Keeps every course entry in document order, repeated keys included, so
// validation can see them instead of a map silently keeping the last one.
fn course_entries<'de, D>(deserializer: D) -> Result<Vec<(String, serde_json::Value)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, serde_json::Value)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of course names to module lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

/// The immutable, validated curriculum.
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    courses: Vec<Course>,
}

impl CourseCatalog {
    /// Loads and validates the catalog from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates the catalog from a JSON document.
    ///
    /// Course order follows the order in which courses appear in the document.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(raw)?;
        let mut courses = Vec::with_capacity(raw.courses.len());
        for (name, value) in raw.courses {
            let modules: Vec<Module> = serde_json::from_value(value)?;
            courses.push(Course { name, modules });
        }
        Self::new(courses)
    }

    /// Builds a catalog from already-typed courses, applying the same validation.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        for course in &courses {
            if course.name.trim().is_empty() {
                return Err(CatalogError::BlankCourseName);
            }
            // Learners select courses case-insensitively, so names must stay distinct that way.
            if !names.insert(normalize_name(&course.name)) {
                return Err(CatalogError::DuplicateCourse(course.name.clone()));
            }
            if course.modules.is_empty() {
                return Err(CatalogError::EmptyCourse(course.name.clone()));
            }
            let mut seen = HashSet::new();
            for module in &course.modules {
                if !seen.insert(module.id) {
                    return Err(CatalogError::DuplicateModule {
                        course: course.name.clone(),
                        module_id: module.id,
                    });
                }
            }
        }
        Ok(Self { courses })
    }

    /// Course names in authoring order.
    pub fn list_courses(&self) -> Vec<&str> {
        self.courses.iter().map(|c| c.name.as_str()).collect()
    }

    /// `(module id, module name)` pairs in curriculum order; empty if the course is unknown.
    pub fn list_modules(&self, course: &str) -> Vec<(u32, &str)> {
        self.course(course)
            .map(|c| c.modules.iter().map(|m| (m.id, m.name.as_str())).collect())
            .unwrap_or_default()
    }

    /// The teaching content of a module, or `None` if the course or module does not exist.
    pub fn get_content(&self, course: &str, module_id: u32) -> Option<&str> {
        self.course(course)?
            .module(module_id)
            .map(|m| m.content.as_str())
    }

    /// Exact lookup by course name.
    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.name == name)
    }

    /// Matches learner input against course names, ignoring case and
    /// surrounding whitespace.
    pub fn find_course(&self, input: &str) -> Option<&Course> {
        let wanted = normalize_name(input);
        self.courses
            .iter()
            .find(|c| normalize_name(&c.name) == wanted)
    }

    /// The course name that best resembles `input`, if any resembles it at all.
    pub fn suggest_course(&self, input: &str) -> Option<&str> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let input = input.trim();
        self.courses
            .iter()
            .filter_map(|c| {
                matcher
                    .fuzzy_match(&c.name, input)
                    .map(|score| (score, c.name.as_str()))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
