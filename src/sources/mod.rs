//! Document sources.
//!
//! Only the local file system is supported; both the live pipeline and the
//! token estimator discover files through [`LocalSource`] so they always
//! agree on which files are in scope.

mod local;

pub use local::LocalSource;
