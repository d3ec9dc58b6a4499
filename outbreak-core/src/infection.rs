//! Version-propagation algorithms over a population.
//!
//! Three flood policies share one traversal discipline: an explicit worklist
//! (never recursion, so stack usage stays bounded on arbitrarily deep
//! graphs) and the already-at-target-version check as the cycle guard. The
//! adjacency graph is not acyclic; a user can be reachable from itself
//! through multiple coach/student paths.

use std::collections::VecDeque;

use tracing::{info, instrument};

use crate::{
    error::InfectionError,
    population::Population,
    user::UserId,
};

/// How an infection run terminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfectionOutcome {
    /// Every user reachable from the seed sees the propagated version.
    Complete,
    /// Propagation stopped because the node budget reached zero while
    /// distinct-version users remained reachable.
    BudgetExhausted,
}

/// The result of a completed infection call.
///
/// `changed` lists exactly the users whose version actually changed, in
/// infection order; it drives the display collaborator's update stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InfectionReport {
    version: u32,
    changed: Vec<UserId>,
    outcome: InfectionOutcome,
}

impl InfectionReport {
    /// Returns the version that was propagated.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the ids whose version changed, in infection order.
    #[must_use]
    pub fn changed(&self) -> &[UserId] {
        &self.changed
    }

    /// Returns how the run terminated.
    #[must_use]
    pub const fn outcome(&self) -> InfectionOutcome {
        self.outcome
    }

    /// Returns whether the seed's component is fully on the new version.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.outcome, InfectionOutcome::Complete)
    }
}

/// Floods `version` from `seed` across its entire connected component.
///
/// Both edge directions are followed; every reachable user whose version
/// differs is updated. Users outside the component are untouched. Calling
/// this twice with the same version is a no-op on the second call: nothing
/// differs, so nothing is visited beyond the seed's neighbourhood and the
/// report's `changed` set is empty.
///
/// # Errors
/// Returns [`InfectionError::UnknownUser`] when `seed` does not name a user
/// in `population`; no version is changed in that case.
///
/// # Examples
/// ```
/// use outbreak_core::{Population, total_infect};
///
/// let mut population = Population::new();
/// let coach = population.spawn();
/// let student = population.spawn();
/// population.enroll(coach, student);
///
/// let report = total_infect(&mut population, coach, 1)?;
/// assert_eq!(report.changed().len(), 2);
/// assert!(report.is_complete());
/// # Ok::<(), outbreak_core::InfectionError>(())
/// ```
#[instrument(
    name = "infection.total",
    err,
    skip(population),
    fields(population = population.len(), seed = %seed, version = version)
)]
pub fn total_infect(
    population: &mut Population,
    seed: UserId,
    version: u32,
) -> Result<InfectionReport, InfectionError> {
    population
        .get(seed)
        .ok_or(InfectionError::UnknownUser { id: seed })?;

    let mut changed = Vec::new();
    if population.version_of(seed) != version {
        population.set_version(seed, version);
        changed.push(seed);
    }

    let mut queue = VecDeque::from([seed]);
    while let Some(id) = queue.pop_front() {
        for next in neighbours(population, id) {
            if population.version_of(next) != version {
                population.set_version(next, version);
                changed.push(next);
                queue.push_back(next);
            }
        }
    }

    info!(infected = changed.len(), "total infection completed");
    Ok(InfectionReport {
        version,
        changed,
        outcome: InfectionOutcome::Complete,
    })
}

/// Floods `version` from `seed`, consuming one unit of `budget` per user
/// whose version actually changes.
///
/// The budget is a single counter shared by the whole traversal. Policy, in
/// priority order:
///
/// 1. The seed is infected first, provided the budget is positive.
/// 2. At each visited user, direct students are infected before direct
///    coaches. Propagation deliberately favours downstream reach over
///    upstream acknowledgement.
/// 3. Newly infected students are queued ahead of newly infected coaches,
///    so student subtrees are traversed first.
/// 4. Once the budget reaches zero mid-scan, a student is still infected
///    when the new version is an upgrade (`version > student.version`),
///    without counting against the cap; students are not left out of
///    upgrades. Coaches get no such exception. The infected count can
///    therefore exceed the nominal budget by upgrade users.
///
/// The outcome is [`InfectionOutcome::Complete`] when every user reachable
/// from the seed sees `version` afterwards, and
/// [`InfectionOutcome::BudgetExhausted`] otherwise.
///
/// # Errors
/// Returns [`InfectionError::UnknownUser`] when `seed` does not name a user
/// in `population`; no version is changed in that case.
///
/// # Examples
/// ```
/// use outbreak_core::{Population, limited_infect};
///
/// let mut population = Population::new();
/// let coach = population.spawn();
/// let student = population.spawn();
/// population.enroll(coach, student);
///
/// let report = limited_infect(&mut population, coach, 1, 1)?;
/// assert_eq!(report.changed(), [coach]);
/// assert!(!report.is_complete());
/// # Ok::<(), outbreak_core::InfectionError>(())
/// ```
#[instrument(
    name = "infection.limited",
    err,
    skip(population),
    fields(population = population.len(), seed = %seed, version = version, budget = budget)
)]
pub fn limited_infect(
    population: &mut Population,
    seed: UserId,
    version: u32,
    budget: usize,
) -> Result<InfectionReport, InfectionError> {
    population
        .get(seed)
        .ok_or(InfectionError::UnknownUser { id: seed })?;

    let mut remaining = budget;
    let mut changed = Vec::new();
    let mut queue = VecDeque::new();

    if remaining > 0 {
        if population.version_of(seed) != version {
            population.set_version(seed, version);
            remaining -= 1;
            changed.push(seed);
        }
        queue.push_back(seed);
    }

    while let Some(id) = queue.pop_front() {
        if remaining == 0 {
            break;
        }

        let mut infected_students = Vec::new();
        for student in students_of(population, id) {
            let current = population.version_of(student);
            if current == version {
                continue;
            }
            if remaining > 0 {
                remaining -= 1;
            } else if version > current {
                // upgrade exception: past the cap, but students are never
                // left behind on an upgrade
            } else {
                continue;
            }
            population.set_version(student, version);
            changed.push(student);
            infected_students.push(student);
        }

        let mut infected_coaches = Vec::new();
        for coach in coaches_of(population, id) {
            if remaining == 0 {
                break;
            }
            if population.version_of(coach) != version {
                population.set_version(coach, version);
                remaining -= 1;
                changed.push(coach);
                infected_coaches.push(coach);
            }
        }

        queue.extend(infected_students);
        queue.extend(infected_coaches);
    }

    let outcome = if component_uniform(population, seed, version) {
        InfectionOutcome::Complete
    } else {
        InfectionOutcome::BudgetExhausted
    };
    info!(
        infected = changed.len(),
        remaining, complete = matches!(outcome, InfectionOutcome::Complete),
        "limited infection finished"
    );
    Ok(InfectionReport {
        version,
        changed,
        outcome,
    })
}

/// Performs a total infection on the first user (in ascending id order)
/// whose connected component has exactly `exact` members.
///
/// Either one full total infection happens, or nothing does: when no
/// component of the requested size exists the population is left untouched.
///
/// # Errors
/// Returns [`InfectionError::NoExactMatch`] when no user's component size
/// equals `exact`.
#[instrument(
    name = "infection.strict",
    err,
    skip(population),
    fields(population = population.len(), version = version, exact = exact)
)]
pub fn strict_infect(
    population: &mut Population,
    version: u32,
    exact: usize,
) -> Result<InfectionReport, InfectionError> {
    let seed = find_exact_component(population, exact)?;
    info!(seed = %seed, "component of requested size located");
    total_infect(population, seed, version)
}

/// Scans ids in ascending order for the first component of `exact` users.
pub(crate) fn find_exact_component(
    population: &Population,
    exact: usize,
) -> Result<UserId, InfectionError> {
    population
        .ids()
        .find(|&id| population.component_size(id) == exact)
        .ok_or(InfectionError::NoExactMatch { requested: exact })
}

fn neighbours(population: &Population, id: UserId) -> Vec<UserId> {
    population.get(id).map_or_else(Vec::new, |user| {
        user.coaches()
            .iter()
            .chain(user.students())
            .copied()
            .collect()
    })
}

fn students_of(population: &Population, id: UserId) -> Vec<UserId> {
    population
        .get(id)
        .map_or_else(Vec::new, |user| user.students().to_vec())
}

fn coaches_of(population: &Population, id: UserId) -> Vec<UserId> {
    population
        .get(id)
        .map_or_else(Vec::new, |user| user.coaches().to_vec())
}

/// Reports whether every user reachable from `seed` sees `version`.
fn component_uniform(population: &Population, seed: UserId, version: u32) -> bool {
    let mut visited = vec![false; population.len()];
    let mut queue = VecDeque::from([seed]);
    visited[seed.index()] = true;
    while let Some(id) = queue.pop_front() {
        if population.version_of(id) != version {
            return false;
        }
        for next in neighbours(population, id) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                queue.push_back(next);
            }
        }
    }
    true
}
