//! Key and keyinfo generation for ffmpeg HLS segment encryption.
//! The descriptor owns the temporary artifacts it creates and removes them on
//! `dispose` or drop; nothing here talks to ffmpeg itself.

pub mod descriptor;
pub mod error;
pub mod format;
pub mod iv;
pub mod random;

pub use descriptor::{KeepArtifacts, KeyDescriptor, KeyFile, KEY_LEN};
pub use error::{CleanupFailure, IoOp, KeyInfoError, Line};
pub use format::KeyInfoFile;
pub use random::{OsRandom, RandomSource};
