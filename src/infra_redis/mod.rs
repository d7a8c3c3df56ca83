mod revocation_store_redis;
mod session_store_redis;

pub use revocation_store_redis::*;
pub use session_store_redis::*;
