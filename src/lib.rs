//! # doxup
//!
//! A post-processor for API documentation generated by dox. Pages are
//! rewritten in place to:
//!
//! - Strip the generator's sidebar navigation dropdowns
//! - Relocate event pseudo-fields (identifiers tagged `_dox_event_`) into
//!   dedicated "Events" and "Inherited Events" sections
//! - Normalize availability annotations, applying the target filtering and
//!   renaming rules for the `clay-web` / `clay-native` targets and plugin
//!   capability tokens
//!
//! ## Quick Start
//!
//! Process every `.html` file under `./docs`:
//!
//! ```no_run
//! use std::path::Path;
//!
//! doxup::process_docs(Path::new("."), false).unwrap();
//! ```
//!
//! Or rewrite a single page held in memory:
//!
//! ```
//! let html = r#"<html><body>
//!     <p class="availability"><em>Available on clay-web, clay-native</em></p>
//! </body></html>"#;
//!
//! let out = doxup::rewrite_html(html).unwrap();
//! assert!(out.contains("<em>Available on clay</em>"));
//! ```

pub mod dom;
pub mod error;
pub mod pipeline;
pub mod rewrite;

pub use error::{Error, Result};
pub use pipeline::process_docs;
pub use rewrite::rewrite_html;
