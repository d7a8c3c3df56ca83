mod authority_fake;
mod authority_impl;
mod jwt_codec;
mod tenant_guard;

pub use authority_fake::*;
pub use authority_impl::*;
pub use jwt_codec::*;
pub use tenant_guard::*;
