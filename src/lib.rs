//! Aomail Admin Client
//!
//! Client-side plumbing for the Aomail admin dashboard: a bearer-token
//! authenticated fetch with one-shot token refresh, REST helpers returning a
//! uniform result envelope, number formatters, and popup notification state.

pub mod auth_client;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetch_data;
pub mod formatters;
pub mod navigator;
pub mod popup;
pub mod token_store;
pub mod types;

pub use auth_client::{AuthClientHttp, AuthClientNoop, AuthenticatedFetch};
pub use config::{AuthClientConfig, ClientConfig};
pub use error::{ClientError, Result};
pub use fetch_data::ApiClient;
pub use formatters::{format_cost, format_float, format_integer, format_token_count};
pub use navigator::{ChannelNavigator, LogNavigator, Navigator, Redirect};
pub use popup::{display_error_popup, display_success_popup, NotificationState, Observable, PopupKind};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{FetchDataResult, RequestDescriptor};
