pub mod definition;
pub mod types;

pub use definition::{
    DEFAULT_URL_TEMPLATE, DefinitionError, Expectation, OUTPUT_PLACEHOLDER, ProbeDefinition,
    RetrySection, TerraformSection, render_url,
};
pub use types::*;
