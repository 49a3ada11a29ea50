pub mod validator;

pub use validator::{DatasetValidator, ValidatorRegistry};
