//! HTTP transport and configuration for fbg sessions.
//!
//! ```rust,ignore
//! let session = fbg_http::connect(&GraphConfig::new(token))?;
//! let me = fbg_model::User::me(&session).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod transport;

pub use config::GraphConfig;
pub use transport::HttpTransport;

use fbg_core::{GraphResult, Session, SessionBuilder};
use tracing::info;

/// Build a session over an [`HttpTransport`] from `config`.
pub fn connect(config: &GraphConfig) -> GraphResult<Session> {
    let transport = HttpTransport::new(config)?;
    let session = SessionBuilder::new(transport)
        .base_url(config.base_url.clone())
        .access_token(config.access_token.clone())
        .build()?;
    info!(base_url = %session.base_url(), "graph session ready");
    Ok(session)
}
