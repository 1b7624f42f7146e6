//! Shared constants for the admin dashboard client

use std::time::Duration;

/// Email provider identifier for Microsoft accounts
pub const MICROSOFT: &str = "microsoft";

/// Email provider identifier for Google accounts
pub const GOOGLE: &str = "google";

/// Storage key holding the admin access token
pub const ACCESS_TOKEN_KEY: &str = "adminAccessToken";

/// Path (relative to the base URL) of the token refresh endpoint
pub const REFRESH_PATH: &str = "token/refresh/";

/// Path (relative to the base URL) of the admin check endpoint
pub const IS_ADMIN_PATH: &str = "is_admin/";

/// Base URL used when no backend is configured
pub const LOCAL_DEV_BASE_URL: &str = "http://localhost:8000/aomail/";

/// How long a popup stays visible
pub const POPUP_DURATION: Duration = Duration::from_millis(4000);

/// Error returned by the data helpers when no response was obtained
pub const NO_SERVER_RESPONSE: &str = "No server response";
