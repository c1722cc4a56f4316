//! Marktree Core
//!
//! This crate provides the document object model shared by the marktree
//! parser and renderers.
//!
//! # Overview
//!
//! The core crate contains:
//! - [`Tree`], [`Node`], [`NodeId`] - Arena-backed document tree storage
//! - [`Kind`], [`NodeValue`], [`ListType`] - The node taxonomy and payloads
//! - [`TreeIter`], [`IterEvent`] - Non-recursive preorder traversal
//! - [`ParseOptions`], [`RenderOptions`], [`Width`] - Behavioral switches
//! - [`codec`] - The packed-word representation of the option sets
//! - [`MarktreeError`] - Error types
//! - [`Position`], [`Span`] - Source location types

pub mod codec;
pub mod error;
pub mod iter;
pub mod node;
pub mod options;
pub mod tree;
pub mod types;

pub use error::{MarktreeError, Result};
pub use iter::{IterEvent, TreeIter};
pub use node::{Kind, ListData, ListType, NodeValue};
pub use options::{ParseOptions, RenderOptions, Width};
pub use tree::{Node, NodeId, Tree};
pub use types::{Position, Span};
