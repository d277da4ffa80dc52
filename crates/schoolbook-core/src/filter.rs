//! # Search Filters
//!
//! Case-insensitive substring search over the text fields of each list.
//! An empty (or whitespace-only) term matches everything. Otherwise the term
//! is matched as typed, inner and trailing spaces included.

use crate::grid::GridStudent;
use crate::models::{Class, Student, Subject, Teacher};

/// Gender filter value that disables gender filtering.
pub const ALL_GENDERS: &str = "All";

/// Lowercased search term. Matching lowercases each candidate field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        Self(raw.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if any field contains the term.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty()
            || fields
                .into_iter()
                .any(|f| f.to_lowercase().contains(&self.0))
    }
}

/// Something that can be found by a text search.
pub trait Searchable {
    /// Fields the search looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, term: &SearchTerm) -> bool {
        term.matches_any(self.search_fields())
    }
}

impl Searchable for GridStudent {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.student_name_eng.as_str(), self.student_name_kh.as_str()]
    }
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.studentname_en.as_str(), self.studentname_kh.as_str()];
        fields.extend(self.class_code.as_deref());
        fields
    }
}

impl Searchable for Teacher {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.teachername_en.as_str(), self.teachername_kh.as_str()];
        fields.extend(self.email.as_deref());
        fields
    }
}

impl Searchable for Subject {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.subject_name.as_str()];
        fields.extend(self.subject_code.as_deref());
        fields
    }
}

impl Searchable for Class {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.class_code.as_str()];
        fields.extend(self.class_year.as_deref());
        fields
    }
}

/// Items matching `raw`, in their original order.
pub fn search<'a, T: Searchable>(items: &'a [T], raw: &str) -> Vec<&'a T> {
    let term = SearchTerm::new(raw);
    items.iter().filter(|item| item.matches(&term)).collect()
}

/// Students matching both an exact gender (unless `"All"`) and a search.
pub fn filter_students<'a>(students: &'a [Student], raw: &str, gender: &str) -> Vec<&'a Student> {
    let term = SearchTerm::new(raw);
    students
        .iter()
        .filter(|s| gender == ALL_GENDERS || s.gender.as_deref() == Some(gender))
        .filter(|s| s.matches(&term))
        .collect()
}
