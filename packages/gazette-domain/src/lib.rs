pub mod dates;
pub mod freshness;
pub mod metrics;
pub mod rank;
pub mod topic;
