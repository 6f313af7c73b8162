#![allow(dead_code)]

pub use jarsync_test_utils::archive;
pub use jarsync_test_utils::builders;
pub use jarsync_test_utils::fake_rebuilder;
pub use jarsync_test_utils::{init_tracing, with_timeout};
