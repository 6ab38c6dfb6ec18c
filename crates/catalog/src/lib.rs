//! Catalog domain module (reference data).
//!
//! Articles are immutable reference data owned by catalog-management screens;
//! this core only reads them (usually via the denormalized [`ArticleRef`]
//! snapshot carried on allocation line-items).

pub mod article;

pub use article::{Article, ArticleRef, ItemType};
