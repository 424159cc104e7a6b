//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → basic_auth.rs (credential check, 401 challenge)
//!     → Pass to dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: any malformed credential rejects the request
//! - Auth failures are not logged beyond the challenge response
//! - Credentials are compared against config loaded once at startup

pub mod basic_auth;
