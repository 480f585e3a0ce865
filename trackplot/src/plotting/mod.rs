pub mod figure;
pub mod genes;
pub mod region;
