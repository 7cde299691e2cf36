pub mod dtos;
pub mod extractors;
pub mod handlers;
pub mod rate_limit;
pub mod router;
