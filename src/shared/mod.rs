pub mod list_query;
pub mod pagination;
pub mod shutdown;

pub use list_query::*;
pub use pagination::*;
pub use shutdown::*;
