//! Error types for the Outbreak core library.
//!
//! Defines the typed failures surfaced at the generation and infection
//! boundaries, each paired with a stable machine-readable code enum.

use std::fmt;

use thiserror::Error;

use crate::user::UserId;

macro_rules! error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $Variant:ident => $code:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $Variant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$Variant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!("Retrieve the stable [`", stringify!($CodeTy), "`] for this error.")]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$Variant { .. } => $CodeTy::$Variant,)+
                }
            }
        }
    };
}

/// An error raised while validating generator parameters.
///
/// Validation happens before any user is created, so a failed build never
/// leaves a partial population behind.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The minimum number of users must be at least one.
    #[error("min_users must be at least 1 (got {got})")]
    InvalidMinUsers {
        /// The invalid minimum supplied by the caller.
        got: i64,
    },
    /// The maximum number of direct students must not be negative.
    #[error("max_students must not be negative (got {got})")]
    InvalidMaxStudents {
        /// The invalid maximum supplied by the caller.
        got: i64,
    },
    /// The number of relationship levels must be at least one.
    #[error("levels must be at least 1 (got {got})")]
    InvalidLevels {
        /// The invalid level count supplied by the caller.
        got: i64,
    },
    /// The reuse probability must be a finite value within `[0.0, 1.0]`.
    #[error("reuse_probability must lie within [0.0, 1.0] (got {got})")]
    InvalidProbability {
        /// The invalid probability supplied by the caller.
        got: f64,
    },
}

error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// The minimum number of users must be at least one.
        InvalidMinUsers => "GENERATOR_INVALID_MIN_USERS",
        /// The maximum number of direct students must not be negative.
        InvalidMaxStudents => "GENERATOR_INVALID_MAX_STUDENTS",
        /// The number of relationship levels must be at least one.
        InvalidLevels => "GENERATOR_INVALID_LEVELS",
        /// The reuse probability must be a finite value within `[0.0, 1.0]`.
        InvalidProbability => "GENERATOR_INVALID_PROBABILITY",
    }
}

/// An error raised while servicing an infection request.
///
/// Every variant is reported before any version changes, so a failed request
/// leaves the population untouched.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InfectionError {
    /// The requested seed id does not name a user in the population.
    #[error("user {id} does not exist in this population")]
    UnknownUser {
        /// Seed id supplied by the caller.
        id: UserId,
    },
    /// The infection budget must not be negative.
    #[error("infection budget must not be negative (got {got})")]
    InvalidBudget {
        /// Budget supplied by the caller.
        got: i64,
    },
    /// No connected component of the requested exact size exists.
    #[error("no connected component of exactly {requested} users exists")]
    NoExactMatch {
        /// Component size requested by the caller.
        requested: usize,
    },
}

error_codes! {
    /// Stable codes describing [`InfectionError`] variants.
    enum InfectionErrorCode for InfectionError {
        /// The requested seed id does not name a user in the population.
        UnknownUser => "INFECTION_UNKNOWN_USER",
        /// The infection budget must not be negative.
        InvalidBudget => "INFECTION_INVALID_BUDGET",
        /// No connected component of the requested exact size exists.
        NoExactMatch => "INFECTION_NO_EXACT_MATCH",
    }
}
