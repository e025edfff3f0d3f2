pub mod error;
pub mod fixture;

pub use error::{Result, SeederError};
pub use fixture::{
    loader::{FixtureLoader, LoadSummary, ensure_demo_user},
    models::Fixture,
    validator::{FixtureValidator, ValidationReport},
};
