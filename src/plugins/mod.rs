pub mod simulation;
pub mod trails;
