//! Resolve request paths against a content bundle and a CMS into rendered pages.
//!
//! The [`Resolver`](application::resolver::Resolver) tries, in order, a static
//! file, a CMS-addressed template and finally an error page. Storage, CMS
//! access and rendering sit behind the traits in [`application`].

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
