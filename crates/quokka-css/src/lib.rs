//! CSS selector support for the quokka toolkit.
//!
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/) plus a few
//! Level 4 features (`:is`, case-insensitive attribute matching) and the
//! non-standard `:text` pseudo-class.

pub mod selector;

pub use selector::{Selector, SelectorError};
