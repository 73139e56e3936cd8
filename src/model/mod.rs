mod dataset;
mod match_record;

pub use dataset::*;
pub use match_record::*;
