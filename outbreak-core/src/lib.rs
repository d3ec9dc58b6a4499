//! Outbreak core library.
//!
//! Models a bidirectional coach/student relationship graph over a user base
//! and propagates version changes ("infections") through it under three
//! policies: unrestricted flood, budget-limited flood, and exact-size flood.

mod error;
mod generator;
mod infection;
mod population;
mod request;
mod user;
mod view;

pub use crate::{
    error::{GeneratorError, GeneratorErrorCode, InfectionError, InfectionErrorCode},
    generator::{DEFAULT_REUSE_PROBABILITY, GeneratorBuilder, UserGenerator},
    infection::{InfectionOutcome, InfectionReport, limited_infect, strict_infect, total_infect},
    population::Population,
    request::{InfectionRequest, apply},
    user::{User, UserId},
    view::{GraphView, publish_population, publish_report},
};
