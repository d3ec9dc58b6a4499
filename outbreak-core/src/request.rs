//! Infection request surface consumed by the presentation collaborator.
//!
//! The collaborator supplies a seed id and a mode; the new version is always
//! the current version plus one, so repeated requests keep rolling the
//! component forward. Validation happens before any traversal, keeping
//! failed requests free of side effects.

use crate::{
    error::InfectionError,
    infection::{self, InfectionReport},
    population::Population,
    user::UserId,
};

/// A user-initiated infection request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfectionRequest {
    /// Unrestricted flood from `seed` across its connected component.
    Total {
        /// User the infection starts from.
        seed: UserId,
    },
    /// Flood from `seed` capped by a node-count budget.
    Limited {
        /// User the infection starts from.
        seed: UserId,
        /// Maximum number of users to infect. Raw collaborator input;
        /// negative values are rejected with a typed error.
        budget: i64,
    },
    /// Total infection of the first component with exactly `exact` members.
    Strict {
        /// Required component size.
        exact: usize,
    },
}

/// Services one infection request against the population.
///
/// The propagated version is the seed's current version plus one (for
/// strict mode, the matching candidate's current version plus one), exactly
/// as the interactive controller in the original system computed it.
///
/// # Errors
/// Returns [`InfectionError::UnknownUser`] for an unknown seed id,
/// [`InfectionError::InvalidBudget`] for a negative limited-mode budget, and
/// [`InfectionError::NoExactMatch`] when strict mode finds no component of
/// the requested size. No version changes on any error path.
///
/// # Examples
/// ```
/// use outbreak_core::{InfectionRequest, Population, apply};
///
/// let mut population = Population::new();
/// let coach = population.spawn();
/// let student = population.spawn();
/// population.enroll(coach, student);
///
/// let report = apply(&mut population, InfectionRequest::Total { seed: coach })?;
/// assert_eq!(report.version(), 1);
/// assert_eq!(report.changed().len(), 2);
/// # Ok::<(), outbreak_core::InfectionError>(())
/// ```
pub fn apply(
    population: &mut Population,
    request: InfectionRequest,
) -> Result<InfectionReport, InfectionError> {
    match request {
        InfectionRequest::Total { seed } => {
            let version = next_version(population, seed)?;
            infection::total_infect(population, seed, version)
        }
        InfectionRequest::Limited { seed, budget } => {
            let budget = usize::try_from(budget)
                .map_err(|_| InfectionError::InvalidBudget { got: budget })?;
            let version = next_version(population, seed)?;
            infection::limited_infect(population, seed, version, budget)
        }
        InfectionRequest::Strict { exact } => {
            let seed = infection::find_exact_component(population, exact)?;
            let version = next_version(population, seed)?;
            infection::total_infect(population, seed, version)
        }
    }
}

fn next_version(population: &Population, seed: UserId) -> Result<u32, InfectionError> {
    population
        .get(seed)
        .map(|user| user.version().saturating_add(1))
        .ok_or(InfectionError::UnknownUser { id: seed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn coached_pair() -> (Population, UserId, UserId) {
        let mut population = Population::new();
        let coach = population.spawn();
        let student = population.spawn();
        population.enroll(coach, student);
        (population, coach, student)
    }

    #[rstest]
    fn negative_budget_is_rejected_without_mutation() {
        let (mut population, coach, student) = coached_pair();
        let err = apply(
            &mut population,
            InfectionRequest::Limited {
                seed: coach,
                budget: -3,
            },
        )
        .expect_err("negative budget must be rejected");

        assert!(matches!(err, InfectionError::InvalidBudget { got: -3 }));
        assert_eq!(population.get(coach).map(|u| u.version()), Some(0));
        assert_eq!(population.get(student).map(|u| u.version()), Some(0));
    }

    #[rstest]
    fn repeated_totals_keep_rolling_versions_forward() {
        let (mut population, coach, _) = coached_pair();
        let first = apply(&mut population, InfectionRequest::Total { seed: coach })
            .expect("first request must succeed");
        let second = apply(&mut population, InfectionRequest::Total { seed: coach })
            .expect("second request must succeed");

        assert_eq!(first.version(), 1);
        assert_eq!(second.version(), 2);
        assert_eq!(second.changed().len(), 2);
    }

    #[rstest]
    fn strict_request_versions_from_the_candidate() {
        let (mut population, coach, _) = coached_pair();
        let lone = population.spawn();
        population.set_version(lone, 5);

        let report = apply(&mut population, InfectionRequest::Strict { exact: 1 })
            .expect("a single-user component exists");
        assert_eq!(report.version(), 6);
        assert_eq!(report.changed(), [lone]);
        assert_eq!(population.get(coach).map(|u| u.version()), Some(0));
    }
}
