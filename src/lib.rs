/* src/lib.rs */

//! Static file responders over the `http` crate types: one file, or a
//! directory tree that requests cannot climb out of.

pub mod body;
pub mod conditional;
pub mod directory;
pub mod error;
pub mod file;
pub mod mime;
pub mod options;
pub mod path;
pub mod range;

pub use body::Body;
pub use directory::{DirectoryResponder, MakeFileResponder};
pub use error::{Error, Rejection};
pub use file::FileResponder;
pub use options::FileOptions;
