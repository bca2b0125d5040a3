pub mod filter;
pub mod pagination;
pub mod record_number;
pub mod validate;

pub use filter::RecordFilter;
pub use pagination::{paginate, Page, PageRequest};
pub use record_number::{RecordNumberGenerator, MAX_RECORD_NO_LEN};
pub use validate::*;
