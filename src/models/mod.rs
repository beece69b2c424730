pub mod analysis;
pub mod enums;
pub mod mood;

pub use analysis::*;
pub use enums::*;
pub use mood::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}
