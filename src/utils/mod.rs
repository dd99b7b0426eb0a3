//! Utility modules for the blog generator.

pub mod slug;
