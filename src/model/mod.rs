pub mod common;
pub mod dates;
pub mod medical_record;
pub mod owner;
pub mod patch;
pub mod pet;

pub use common::*;
pub use dates::{DateFormat, DateParser, DEFAULT_DATE_FORMATS};
pub use medical_record::*;
pub use owner::*;
pub use patch::*;
pub use pet::*;
