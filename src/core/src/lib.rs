#![allow(clippy::result_large_err)]
//! # APQP Core
//!
//! Typed client for the APQP/PPAP quality-management REST backend.
//!
//! ## Architecture
//!
//! - **Request Core**: one HTTP chokepoint with CSRF handling and uniform response normalization
//! - **Resources**: typed list/get/filter/create/update/delete per backend collection, plus relationship actions
//! - **Session**: login, logout and auth checks against the permission-introspection endpoint
//! - **Permissions**: pure allow/deny decisions over the cached authorization profile
//! - **Telemetry**: structured logging with redaction of credentials and cookies, request metrics
//!
//! ```no_run
//! use apqp_core::prelude::*;
//!
//! # async fn run() -> apqp_core::Result<()> {
//! let client = ApqpClient::from_config(&ClientConfig::load()?)?;
//! client.auth.login("alice", "secret").await?;
//! if client.auth.has_permission("read", "project", None) {
//!     let projects = client.api.projects().by_status("active").await?;
//!     println!("{} active projects", projects.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod permissions;
pub mod resources;
pub mod session;
pub mod telemetry;

pub use context::ApqpClient;
pub use error::{ApqpError, ErrorCode, ErrorSeverity, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{ApiClient, Method, PageResponse};
    pub use crate::config::{ApiConfig, AuthConfig, ClientConfig};
    pub use crate::context::ApqpClient;
    pub use crate::error::{ApqpError, ErrorCode, ErrorSeverity, Result};
    pub use crate::models::{Id, ListPayload, Page, Record};
    pub use crate::permissions::{
        Action, AuthorizationLevel, AuthorizationProfile, PermissionSets, PolicyDecision,
    };
    pub use crate::resources::{Api, Deletable, Mutable, Resource, ResourceClient};
    pub use crate::session::{AuthManager, CurrentUser, Session};
    pub use crate::telemetry::{init_logging, LogFormat, LoggingConfig};
}
