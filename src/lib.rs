pub mod dinic;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod prepare;
