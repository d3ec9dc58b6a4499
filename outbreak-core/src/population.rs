//! Population container owning every user in the graph.
//!
//! The population is an id-indexed table: users reference each other only by
//! [`UserId`], so the cyclic coach/student relation never creates ownership
//! cycles. Edges are added only at construction time and no user or edge is
//! ever removed during a run.

use std::collections::VecDeque;

use crate::user::{User, UserId};

/// Owns all users of a generated user base.
///
/// # Examples
/// ```
/// use outbreak_core::Population;
///
/// let mut population = Population::new();
/// let coach = population.spawn();
/// let student = population.spawn();
/// population.enroll(coach, student);
/// assert!(population.is_symmetric());
/// assert_eq!(population.component_size(coach), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Population {
    users: Vec<User>,
}

impl Population {
    /// Creates an empty population.
    #[must_use]
    pub const fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Creates an isolated user at the base version and returns its id.
    pub fn spawn(&mut self) -> UserId {
        let id = UserId::new(self.users.len());
        self.users.push(User::new(id));
        id
    }

    /// Records the symmetric coach/student relation between two users.
    ///
    /// Both directions are wired in one step so the structural invariant
    /// (`student ∈ coach.students ⟺ coach ∈ student.coaches`) holds by
    /// construction. Both ids must have been returned by [`Self::spawn`] on
    /// this population.
    pub fn enroll(&mut self, coach: UserId, student: UserId) {
        self.users[coach.index()].push_student(student);
        self.users[student.index()].push_coach(coach);
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(id.index())
    }

    /// Iterates over every user in id order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Iterates over every id in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = UserId> + use<> {
        (0..self.users.len()).map(UserId::new)
    }

    /// Returns the number of users in the population.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns whether the population contains no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Counts the users reachable from `id` via coach and student edges,
    /// including `id` itself.
    ///
    /// Computed with an iterative visited-set traversal on every call; the
    /// graph is immutable after construction apart from versions, so the
    /// count is stable but deliberately not cached. An unknown id has an
    /// empty component.
    #[must_use]
    pub fn component_size(&self, id: UserId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        let mut visited = vec![false; self.users.len()];
        let mut queue = VecDeque::from([id]);
        visited[id.index()] = true;
        let mut count = 0;
        while let Some(current) = queue.pop_front() {
            count += 1;
            let user = &self.users[current.index()];
            for &next in user.coaches().iter().chain(user.students()) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    /// Checks the structural invariant of the relation: for all users A and
    /// B, B appears in A's students exactly when A appears in B's coaches.
    ///
    /// Exposed as a plain predicate so tests can assert it directly.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.users.iter().all(|user| {
            user.students()
                .iter()
                .all(|student| self.linked(user.id(), *student))
                && user
                    .coaches()
                    .iter()
                    .all(|coach| self.linked(*coach, user.id()))
        })
    }

    fn linked(&self, coach: UserId, student: UserId) -> bool {
        let Some(coach_user) = self.get(coach) else {
            return false;
        };
        let Some(student_user) = self.get(student) else {
            return false;
        };
        coach_user.students().contains(&student)
            && student_user.coaches().contains(&coach)
    }

    /// Checks the version invariant of a fully infected neighbourhood:
    /// every direct coach and student of `id` sees the same version as `id`.
    ///
    /// After a total infection this holds for every user in the seed's
    /// component. Unknown ids report `false`.
    #[must_use]
    pub fn neighbours_aligned(&self, id: UserId) -> bool {
        let Some(user) = self.get(id) else {
            return false;
        };
        user.coaches()
            .iter()
            .chain(user.students())
            .all(|&other| self.users[other.index()].version() == user.version())
    }

    pub(crate) fn version_of(&self, id: UserId) -> u32 {
        self.users[id.index()].version()
    }

    pub(crate) fn set_version(&mut self, id: UserId, version: u32) {
        self.users[id.index()].set_version(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chain(len: usize) -> (Population, Vec<UserId>) {
        let mut population = Population::new();
        let ids: Vec<UserId> = (0..len).map(|_| population.spawn()).collect();
        for pair in ids.windows(2) {
            population.enroll(pair[0], pair[1]);
        }
        (population, ids)
    }

    #[rstest]
    fn enroll_wires_both_directions() {
        let mut population = Population::new();
        let coach = population.spawn();
        let student = population.spawn();
        population.enroll(coach, student);

        let coach_user = population.get(coach).expect("coach must exist");
        let student_user = population.get(student).expect("student must exist");
        assert_eq!(coach_user.students(), [student]);
        assert_eq!(student_user.coaches(), [coach]);
        assert!(population.is_symmetric());
    }

    #[rstest]
    #[case::isolated(1)]
    #[case::pair(2)]
    #[case::chain(5)]
    fn component_size_counts_reachable_users(#[case] len: usize) {
        let (population, ids) = chain(len);
        for &id in &ids {
            assert_eq!(population.component_size(id), len);
        }
    }

    #[rstest]
    fn component_size_ignores_other_components() {
        let mut population = Population::new();
        let a = population.spawn();
        let b = population.spawn();
        population.enroll(a, b);
        let lone = population.spawn();

        assert_eq!(population.component_size(a), 2);
        assert_eq!(population.component_size(lone), 1);
    }

    #[rstest]
    fn component_size_handles_cycles() {
        let mut population = Population::new();
        let a = population.spawn();
        let b = population.spawn();
        let c = population.spawn();
        population.enroll(a, b);
        population.enroll(b, c);
        population.enroll(c, a);

        assert_eq!(population.component_size(a), 3);
    }

    #[rstest]
    fn unknown_id_has_empty_component() {
        let population = Population::new();
        assert_eq!(population.component_size(UserId::new(7)), 0);
        assert!(!population.neighbours_aligned(UserId::new(7)));
    }

    #[rstest]
    fn neighbours_aligned_detects_version_drift() {
        let (mut population, ids) = chain(3);
        assert!(population.neighbours_aligned(ids[1]));

        population.set_version(ids[2], 1);
        assert!(!population.neighbours_aligned(ids[1]));
        assert!(population.neighbours_aligned(ids[0]));
    }
}
