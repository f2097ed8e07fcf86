//! tessera Core Library
//!
//! Shared types for tessera.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `ApplicationId`, `GroupId`, ...)
//! - [`error`] - Standardized error types (`TesseraError`)
//!
//! # Example
//!
//! ```
//! use tessera_core::{ApplicationId, UserId, TesseraError, Result};
//!
//! let user_id = UserId::new();
//! let app_id = ApplicationId::new();
//!
//! fn example() -> Result<()> {
//!     Err(TesseraError::Unauthorized { message: None })
//! }
//! ```

pub mod error;
pub mod ids;

pub use error::{Result, TesseraError};
pub use ids::{ApplicationId, GrantId, GroupId, TokenId, UserId};
