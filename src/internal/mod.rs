//! Internal implementation details.

mod chain;
mod hooks;

pub(crate) use chain::ResolutionChain;
pub(crate) use hooks::HookBag;
pub use hooks::BoxFutureUnit;
