pub mod trait_impl;
pub mod google;

pub use trait_impl::Provider as ProviderTrait;
pub use crate::config::Provider;
