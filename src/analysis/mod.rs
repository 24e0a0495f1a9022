pub mod aggregate;
pub mod kruskal;
pub mod pipeline;
pub mod regression;
