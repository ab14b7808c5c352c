//! Domain entities. Pure data structures for the core business.
//!
//! No storage/transport types here; adapters map their rows into these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::DomainError;

/// Course titles seeded on first start, in display order.
pub const COURSE_TITLES: [&str; 4] = ["Maths", "Logic Programming", "Image Analysis", "Web Development"];

/// Hobby titles seeded on first start, in display order.
pub const HOBBY_TITLES: [&str; 7] = [
    "Painting",
    "Music",
    "Basketball",
    "Gym",
    "Tennis",
    "Reading",
    "Cooking",
];

/// The two disjoint category classes. Courses sort before hobbies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Course,
    Hobby,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Course => "course",
            CategoryKind::Hobby => "hobby",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course" => Ok(CategoryKind::Course),
            "hobby" => Ok(CategoryKind::Hobby),
            other => Err(DomainError::Repo(format!("unknown category kind: {}", other))),
        }
    }
}

/// A course or hobby a conversation belongs to. Immutable once seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub kind: CategoryKind,
    pub title: String,
}

impl Category {
    pub fn new(kind: CategoryKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
        }
    }

    /// Fresh seed rows: all courses, then all hobbies.
    pub fn seed_set() -> Vec<Category> {
        COURSE_TITLES
            .iter()
            .map(|t| Category::new(CategoryKind::Course, *t))
            .chain(
                HOBBY_TITLES
                    .iter()
                    .map(|t| Category::new(CategoryKind::Hobby, *t)),
            )
            .collect()
    }
}

/// Stable user identity issued by the identity provider. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Portal user as mirrored from the identity system. Read-mostly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name; also what the portal shows in participant pickers.
    pub user_name: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_set_lists_courses_before_hobbies() {
        let seed = Category::seed_set();
        assert_eq!(seed.len(), COURSE_TITLES.len() + HOBBY_TITLES.len());
        assert!(seed[..4].iter().all(|c| c.kind == CategoryKind::Course));
        assert!(seed[4..].iter().all(|c| c.kind == CategoryKind::Hobby));
        assert_eq!(seed[0].title, "Maths");
        assert_eq!(seed[4].title, "Painting");
    }

    #[test]
    fn test_category_kind_round_trips_through_str() {
        assert_eq!("course".parse::<CategoryKind>().unwrap(), CategoryKind::Course);
        assert_eq!(CategoryKind::Hobby.as_str().parse::<CategoryKind>().unwrap(), CategoryKind::Hobby);
        assert!("club".parse::<CategoryKind>().is_err());
    }
}
