//! File-backed reading position store for `epub-triptych`.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod file_store;

pub use file_store::{FileProgressStore, StoreError};
