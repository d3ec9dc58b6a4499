//! Display seam between the core and the presentation collaborator.
//!
//! The core never renders anything; it reports the authoritative state
//! through [`GraphView`] and leaves layout entirely to the implementor.

use crate::{
    infection::InfectionReport,
    population::Population,
    user::UserId,
};

/// Sink for graph state changes, implemented by the presentation layer.
///
/// # Examples
/// ```
/// use outbreak_core::{GraphView, Population, UserId, publish_population};
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl GraphView for Count {
///     fn add_node(&mut self, _: UserId, _: u32, _: &[UserId], _: &[UserId]) {
///         self.0 += 1;
///     }
///     fn update_node(&mut self, _: UserId, _: u32) {}
/// }
///
/// let mut population = Population::new();
/// population.spawn();
/// let mut view = Count::default();
/// publish_population(&population, &mut view);
/// assert_eq!(view.0, 1);
/// ```
pub trait GraphView {
    /// Reports one node and its adjacency, called once per user after
    /// generation.
    fn add_node(&mut self, id: UserId, version: u32, coaches: &[UserId], students: &[UserId]);

    /// Reports the final authoritative version of a node whose version
    /// changed during an infection call.
    fn update_node(&mut self, id: UserId, version: u32);
}

/// Announces every user of a freshly generated population to the view.
pub fn publish_population<V: GraphView + ?Sized>(population: &Population, view: &mut V) {
    for user in population.users() {
        view.add_node(user.id(), user.version(), user.coaches(), user.students());
    }
}

/// Announces the version changes of a completed infection to the view.
///
/// Only users whose version actually changed are reported.
pub fn publish_report<V: GraphView + ?Sized>(report: &InfectionReport, view: &mut V) {
    for &id in report.changed() {
        view.update_node(id, report.version());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infection::total_infect;

    #[derive(Default)]
    struct Recording {
        added: Vec<(UserId, u32, usize, usize)>,
        updated: Vec<(UserId, u32)>,
    }

    impl GraphView for Recording {
        fn add_node(&mut self, id: UserId, version: u32, coaches: &[UserId], students: &[UserId]) {
            self.added.push((id, version, coaches.len(), students.len()));
        }

        fn update_node(&mut self, id: UserId, version: u32) {
            self.updated.push((id, version));
        }
    }

    #[test]
    fn publishes_nodes_then_updates() {
        let mut population = Population::new();
        let coach = population.spawn();
        let student = population.spawn();
        population.enroll(coach, student);
        let outsider = population.spawn();

        let mut view = Recording::default();
        publish_population(&population, &mut view);
        assert_eq!(view.added.len(), 3);
        assert_eq!(view.added[0], (coach, 0, 0, 1));
        assert_eq!(view.added[1], (student, 0, 1, 0));
        assert_eq!(view.added[2], (outsider, 0, 0, 0));

        let report = total_infect(&mut population, coach, 1).expect("seed exists");
        publish_report(&report, &mut view);
        assert_eq!(view.updated, [(coach, 1), (student, 1)]);
    }
}
