pub mod match_queries;
