//! Crate-level retrieval tests over populated stores.
