pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{Result, TessError};
pub use tolerance::Tolerance;
