//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound proxy request
//!     → connect.rs (dial: TCP, or SOCKS5 tunnel, then TLS handshake)
//!     → tls.rs (client certificate bundle, CA trust root)
//!     → Hand off to the HTTP client
//! ```
//!
//! # Design Decisions
//! - One connector serves every upstream leg; the dialing strategy is fixed
//!   at startup from the configuration
//! - TLS material is loaded eagerly at startup, never per-request
//! - The SOCKS tunnel applies only to TLS connections

pub mod connect;
pub mod tls;
