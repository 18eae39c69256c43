//! arbor: a hierarchical tree editor.
//!
//! One rooted tree of labeled nodes, edited through add/rename/remove/reset,
//! persisted as JSON in a key-value slot after every change and rendered to a
//! view. Layers follow the usual split: `domain` (tree rules), `application`
//! (document session, persistence, export), `infrastructure` (stores, views,
//! exporters, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
