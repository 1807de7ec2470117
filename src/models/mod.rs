pub mod mode;
pub mod repository;
pub mod report;

pub use mode::*;
pub use repository::*;
pub use report::*;
