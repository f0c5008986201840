pub mod de;
pub mod error;
pub mod validation;

pub use error::{PveError, Result};
