//! # annal_web
//!
//! Transport-agnostic request handling for an Annalist site. An HTTP
//! front end converts each request to a [`Request`], passes it to
//! [`Annalist::handle`] and writes the returned [`Response`].
//!
//! ## Modules
//!
//! - [`routes`]: path to route resolution
//! - [`actions`]: permission required for each action
//! - [`negotiate`]: `Accept` header handling
//! - [`handler`]: the dispatcher
//! - [`pages`], [`turtle`]: HTML and Turtle output
//!
//! ## Example
//!
//! ```rust,ignore
//! use annal_models::Site;
//! use annal_web::{Annalist, Request};
//!
//! let site = Site::new("/var/annalist", "http://localhost:8000/annalist/")?;
//! let app = Annalist::new(site);
//! let resp = app.handle(&Request::get("/annalist/c/testcoll/d/testtype/entity1/")
//!     .with_accept("application/ld+json"));
//! ```

pub mod actions;
pub mod handler;
pub mod http;
pub mod negotiate;
pub mod pages;
pub mod routes;
pub mod turtle;

pub use actions::{Action, SiteAction, required_permission};
pub use handler::Annalist;
pub use http::{ErrorInfo, Method, Request, Response, UserIdentity};
pub use negotiate::{Representation, negotiate};
pub use routes::{Route, parse_route};
