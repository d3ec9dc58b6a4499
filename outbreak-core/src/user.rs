//! User vertices of the coach/student graph.
//!
//! A [`User`] records its identity, the version it currently sees, and the
//! two ordered adjacency lists that make up the symmetric coach/student
//! relation. Users never own each other; every edge is a plain [`UserId`]
//! into the owning [`crate::Population`].

use std::fmt;

/// Identifier of a user within its [`crate::Population`].
///
/// Ids are dense indexes assigned in creation order, so a fixed generation
/// seed always yields the same ids.
///
/// # Examples
/// ```
/// use outbreak_core::UserId;
///
/// let id = UserId::new(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.to_string(), "u3");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UserId(usize);

impl UserId {
    /// Creates an id from a population index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the population index backing this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// An individual user of the software.
///
/// The version is the only field that changes after construction; adjacency
/// is append-only and wired exclusively through
/// [`crate::Population::enroll`], which always records both directions of
/// the relation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    id: UserId,
    version: u32,
    coaches: Vec<UserId>,
    students: Vec<UserId>,
}

impl User {
    pub(crate) const fn new(id: UserId) -> Self {
        Self {
            id,
            version: 0,
            coaches: Vec::new(),
            students: Vec::new(),
        }
    }

    /// Returns this user's id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the version this user currently sees (base version is 0).
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns a read-only view of this user's coaches.
    #[must_use]
    pub fn coaches(&self) -> &[UserId] {
        &self.coaches
    }

    /// Returns a read-only view of this user's students.
    #[must_use]
    pub fn students(&self) -> &[UserId] {
        &self.students
    }

    pub(crate) fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub(crate) fn push_coach(&mut self, coach: UserId) {
        self.coaches.push(coach);
    }

    pub(crate) fn push_student(&mut self, student: UserId) {
        self.students.push(student);
    }
}
