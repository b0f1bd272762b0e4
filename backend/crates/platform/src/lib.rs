//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations with no domain
//! knowledge:
//! - Cryptographic utilities (random material, constant-time compare)
//! - Password hashing and strength policy (bcrypt, fixed work factor)
//! - Outbound mail capability (trait + HTTP relay client)

pub mod crypto;
pub mod mailer;
pub mod password;
