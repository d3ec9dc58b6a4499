//! Tests for the random user-base generator.

use outbreak_core::{GeneratorBuilder, GeneratorError, Population};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

fn generate(
    min_users: usize,
    max_students: usize,
    levels: usize,
    reuse_probability: f64,
    rng_seed: u64,
) -> Population {
    let generator = GeneratorBuilder::new()
        .with_min_users(min_users)
        .with_max_students(max_students)
        .with_levels(levels)
        .with_reuse_probability(reuse_probability)
        .build()
        .expect("configuration must be valid");
    let mut rng = SmallRng::seed_from_u64(rng_seed);
    generator.generate(&mut rng)
}

#[rstest]
#[case::small(10, 10, 3, 1)]
#[case::wide(5, 20, 2, 7)]
#[case::deep(2, 3, 6, 99)]
fn population_meets_structural_bounds(
    #[case] min_users: usize,
    #[case] max_students: usize,
    #[case] levels: usize,
    #[case] rng_seed: u64,
) {
    let population = generate(min_users, max_students, levels, 0.1, rng_seed);

    assert!(population.len() >= min_users);
    assert!(population.is_symmetric());
    for user in population.users() {
        assert!(user.students().len() <= max_students);
    }
}

#[rstest]
#[case(3)]
#[case(17)]
fn no_duplicate_students_and_no_self_coaching(#[case] rng_seed: u64) {
    let population = generate(10, 8, 3, 0.5, rng_seed);

    for user in population.users() {
        let mut students = user.students().to_vec();
        students.sort_unstable();
        students.dedup();
        assert_eq!(students.len(), user.students().len());
        assert!(!user.students().contains(&user.id()));
    }
}

#[rstest]
fn single_user_edge_case() {
    let population = generate(1, 0, 3, 0.1, 0);

    assert_eq!(population.len(), 1);
    let user = population.users().next().expect("one user must exist");
    assert!(user.coaches().is_empty());
    assert!(user.students().is_empty());
}

#[rstest]
fn zero_reuse_probability_yields_a_forest() {
    let population = generate(6, 5, 3, 0.0, 11);

    assert!(population.is_symmetric());
    for user in population.users() {
        // without reuse nobody converges, so a user has at most one coach
        assert!(user.coaches().len() <= 1);
    }
}

#[rstest]
fn full_reuse_probability_still_generates_validly() {
    // known caveat: p = 1.0 cannot saturate full randomness, but the
    // population must still be structurally sound
    let population = generate(8, 4, 3, 1.0, 23);

    assert!(population.len() >= 8);
    assert!(population.is_symmetric());
}

#[rstest]
fn invalid_minimum_users_fails_before_generation() {
    let err = GeneratorBuilder::new()
        .with_min_users(0)
        .build()
        .expect_err("zero minimum must be rejected");
    assert!(matches!(err, GeneratorError::InvalidMinUsers { got: 0 }));
}

#[rstest]
fn invalid_levels_fails_before_generation() {
    let err = GeneratorBuilder::new()
        .with_levels(0)
        .build()
        .expect_err("zero levels must be rejected");
    assert!(matches!(err, GeneratorError::InvalidLevels { got: 0 }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_populations_are_always_symmetric(
        min_users in 1_usize..12,
        max_students in 0_usize..8,
        levels in 1_usize..5,
        reuse in 0.0_f64..=1.0,
        rng_seed in any::<u64>(),
    ) {
        let population = generate(min_users, max_students, levels, reuse, rng_seed);

        prop_assert!(population.len() >= min_users);
        prop_assert!(population.is_symmetric());
        for user in population.users() {
            prop_assert!(user.students().len() <= max_students);
        }
    }
}
