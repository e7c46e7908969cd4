//! Typed operation groups. Each call issues exactly one store command
//! through `KvFacade::execute`.

mod hash;
mod keys;
mod lists;
mod sets;
mod sorted_set;
mod strings;

pub use hash::Hash;
pub use keys::{Keys, SortParams, DEFAULT_CACHE_SECONDS};
pub use lists::Lists;
pub use sets::Sets;
pub use sorted_set::SortedSet;
pub use strings::Strings;
