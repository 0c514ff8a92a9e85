//! Centralized constants for default endpoints, paging and UA.

/// Default UA sent with every request.
pub(crate) const USER_AGENT: &str = concat!("orders-rs/", env!("CARGO_PKG_VERSION"));

/// Orders listing endpoint, relative to the service base URL.
pub(crate) const ORDERS_PATH: &str = "order-management/api/v1/orders";

/// Users collection, relative to the service base URL. The refresh-token
/// endpoint is `{USERS_PATH}/{user_id}/{REFRESH_SEGMENT}`.
pub(crate) const USERS_PATH: &str = "user-management/api/v1/users";
pub(crate) const REFRESH_SEGMENT: &str = "refreshToken";

/// Header carrying the id token on every authorized request.
pub(crate) const ID_TOKEN_HEADER: &str = "Idtoken";

/// Page-size cap sent with each unit request. Units are never paginated.
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 75;

/// Per-request timeout. A timeout counts as a transient failure.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
