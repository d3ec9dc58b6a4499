//! Random user-base generation under size, depth and branching constraints.
//!
//! The generator builds a population of `min_users` independent trees whose
//! nodes occasionally converge on already-existing users, producing the
//! non-tree shapes the infection algorithms must survive. Randomness comes
//! from an injected [`SmallRng`], so a fixed seed reproduces the same
//! population byte for byte.

use rand::{Rng, rngs::SmallRng};
use tracing::{info, instrument};

use crate::{error::GeneratorError, population::Population, user::UserId};

/// Probability of linking a prospective student to an existing user instead
/// of creating a fresh one. Higher values increase convergence but cannot
/// reach full randomness saturation; treat as a tuning knob, not a defect.
pub const DEFAULT_REUSE_PROBABILITY: f64 = 0.1;

/// Configures and constructs [`UserGenerator`] instances.
///
/// # Examples
/// ```
/// use outbreak_core::GeneratorBuilder;
///
/// let generator = GeneratorBuilder::new()
///     .with_min_users(10)
///     .with_max_students(10)
///     .with_levels(3)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(generator.min_users(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorBuilder {
    min_users: usize,
    max_students: usize,
    levels: usize,
    reuse_probability: f64,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            min_users: 1,
            max_students: 0,
            levels: 1,
            reuse_probability: DEFAULT_REUSE_PROBABILITY,
        }
    }
}

impl GeneratorBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the minimum number of users to generate.
    #[must_use]
    pub fn with_min_users(mut self, min_users: usize) -> Self {
        self.min_users = min_users;
        self
    }

    /// Overrides the maximum number of direct students per user.
    #[must_use]
    pub fn with_max_students(mut self, max_students: usize) -> Self {
        self.max_students = max_students;
        self
    }

    /// Overrides the number of coach/student levels to descend.
    #[must_use]
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Overrides the probability of reusing an existing user as a student.
    #[must_use]
    pub fn with_reuse_probability(mut self, reuse_probability: f64) -> Self {
        self.reuse_probability = reuse_probability;
        self
    }

    /// Validates the configuration and constructs a [`UserGenerator`].
    ///
    /// Validation is fail-fast: a rejected configuration never creates a
    /// user.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidMinUsers`] when `min_users` is zero,
    /// [`GeneratorError::InvalidLevels`] when `levels` is zero, and
    /// [`GeneratorError::InvalidProbability`] when the reuse probability is
    /// not a finite value within `[0.0, 1.0]`.
    ///
    /// # Examples
    /// ```
    /// use outbreak_core::{GeneratorBuilder, GeneratorError};
    ///
    /// let err = GeneratorBuilder::new().with_min_users(0).build().unwrap_err();
    /// assert!(matches!(err, GeneratorError::InvalidMinUsers { got: 0 }));
    /// ```
    pub fn build(self) -> Result<UserGenerator, GeneratorError> {
        if self.min_users < 1 {
            return Err(GeneratorError::InvalidMinUsers {
                got: self.min_users as i64,
            });
        }
        if self.levels < 1 {
            return Err(GeneratorError::InvalidLevels {
                got: self.levels as i64,
            });
        }
        if !self.reuse_probability.is_finite()
            || !(0.0..=1.0).contains(&self.reuse_probability)
        {
            return Err(GeneratorError::InvalidProbability {
                got: self.reuse_probability,
            });
        }
        Ok(UserGenerator {
            min_users: self.min_users,
            max_students: self.max_students,
            levels: self.levels,
            reuse_probability: self.reuse_probability,
        })
    }
}

/// Generates random artificial user bases from a validated configuration.
#[derive(Clone, Debug)]
pub struct UserGenerator {
    min_users: usize,
    max_students: usize,
    levels: usize,
    reuse_probability: f64,
}

impl UserGenerator {
    /// Returns the configured minimum number of users.
    #[must_use]
    pub const fn min_users(&self) -> usize {
        self.min_users
    }

    /// Returns the configured maximum number of direct students per user.
    #[must_use]
    pub const fn max_students(&self) -> usize {
        self.max_students
    }

    /// Returns the configured number of relationship levels.
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the configured reuse probability.
    #[must_use]
    pub const fn reuse_probability(&self) -> f64 {
        self.reuse_probability
    }

    /// Generates a population of at least `min_users` users.
    ///
    /// Each of the `min_users` roots receives a uniformly sampled number of
    /// direct students in `[0, max_students]`; generation descends `levels`
    /// deep, but only ever into freshly created students. With
    /// `reuse_probability`, a prospective student is drawn from the users
    /// created so far instead, provided the link would neither duplicate an
    /// existing edge nor make a user its own student; otherwise a fresh
    /// user is created. Every link is wired symmetrically.
    ///
    /// # Examples
    /// ```
    /// use outbreak_core::GeneratorBuilder;
    /// use rand::{SeedableRng, rngs::SmallRng};
    ///
    /// let generator = GeneratorBuilder::new()
    ///     .with_min_users(5)
    ///     .with_max_students(3)
    ///     .with_levels(2)
    ///     .build()
    ///     .expect("configuration is valid");
    /// let mut rng = SmallRng::seed_from_u64(7);
    /// let population = generator.generate(&mut rng);
    /// assert!(population.len() >= 5);
    /// assert!(population.is_symmetric());
    /// ```
    #[instrument(
        name = "generator.generate",
        skip(self, rng),
        fields(
            min_users = self.min_users,
            max_students = self.max_students,
            levels = self.levels
        )
    )]
    pub fn generate(&self, rng: &mut SmallRng) -> Population {
        let mut population = Population::new();
        for _ in 0..self.min_users {
            let root = population.spawn();
            self.populate(&mut population, rng, root);
        }
        info!(users = population.len(), "population generated");
        population
    }

    /// Populates the student subtree below `root` with an explicit
    /// worklist, so depth is bounded by the heap rather than the stack.
    fn populate(&self, population: &mut Population, rng: &mut SmallRng, root: UserId) {
        let mut pending = vec![(root, self.levels)];
        while let Some((user, levels)) = pending.pop() {
            if levels == 0 {
                continue;
            }
            let count = (rng.gen_range(0.0..1.0_f64) * self.max_students as f64).round() as usize;
            for _ in 0..count {
                match self.reuse_candidate(population, rng, user) {
                    Some(existing) => population.enroll(user, existing),
                    None => {
                        let fresh = population.spawn();
                        population.enroll(user, fresh);
                        pending.push((fresh, levels - 1));
                    }
                }
            }
        }
    }

    /// Picks an existing user to reuse as a student of `coach`, or `None`
    /// to create a fresh one.
    fn reuse_candidate(
        &self,
        population: &Population,
        rng: &mut SmallRng,
        coach: UserId,
    ) -> Option<UserId> {
        if rng.gen_range(0.0..1.0_f64) >= self.reuse_probability {
            return None;
        }
        let candidate = UserId::new(rng.gen_range(0..population.len()));
        let coach_user = population.get(coach)?;
        if candidate == coach || coach_user.students().contains(&candidate) {
            return None;
        }
        Some(candidate)
    }
}
