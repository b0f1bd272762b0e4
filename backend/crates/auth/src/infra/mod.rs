//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod postgres;
pub mod redis;

pub use postgres::PgAuthRepository;
pub use redis::RedisTokenCache;
