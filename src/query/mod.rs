pub mod descriptor;
pub mod interpret;
pub mod vocabulary;

pub use descriptor::{Mode, ParamValue, Parameters, RequestDescriptor};
pub use interpret::{explicit_year, interpret, year_span_bounds};
pub use vocabulary::{GenreTable, Vocabulary};
