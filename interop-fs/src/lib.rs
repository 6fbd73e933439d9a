//! Filesystem abstraction for shape-interop.
//!
//! Reports and suite files go through the [`Filesystem`] trait so the CLI
//! commands can be tested against [`MockFilesystem`].

mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};
