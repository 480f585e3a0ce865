pub mod annotation;
pub mod coverage;
pub mod feature_table;
