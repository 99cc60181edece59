pub mod block;
pub mod branch;
pub mod line;
pub mod program;
