//! Selector engine for the Wallaby toolkit.
//!
//! Parses a CSS-like selector string into rule chains and evaluates them
//! against a [`wallaby_dom::DomTree`] with a configurable breadth/depth
//! traversal. The grammar is error-tolerant; evaluation is read-only.
//!
//! Supported steps: `tag`, `*`, `#id`, `.class[.class...]`, `[key]`,
//! `[key=v]`, `[key^=v]`, `[key$=v]`, `[key*=v]` (raw regex with a
//! leading `/`), `[key!=v]`, `[!key]`, numeric `tag[N]`, and the
//! `plaintext` pseudo-key. A `>` between steps restricts the following
//! step to immediate children.

mod parse;
mod seek;

pub use parse::{Operator, Pattern, Rule, RuleChain, parse_selector};
pub use seek::{query, query_nth, seek};
