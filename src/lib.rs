//! The library code for the `blogsmith` blog builder. The architecture can be
//! generally broken down into two distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::post`])
//! 2. Converting the posts into output files on disk ([`crate::build`])
//!
//! Of the two, the second step is the more involved. It is itself composed of
//! three distinct sub-steps:
//!
//! 1. Rendering each post's Markdown body ([`crate::markdown`]), which pulls
//!    a trailing references section out into a card of its own
//! 2. Templating each post into a full page ([`crate::templates`])
//! 3. Patching the hand-maintained home page and articles index, replacing
//!    only the regions between their marker comments ([`crate::html`])
//!
//! [`crate::watch`] re-runs the whole build whenever a post changes.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod html;
pub mod markdown;
pub mod post;
pub mod templates;
pub mod watch;
