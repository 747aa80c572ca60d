//! Package metadata record for konfig.
//!
//! Every package carries one `Konfigfile` at its root recording where the
//! package came from: the upstream repository, ref, subdirectory, and the
//! exact commit last synchronized. The update engine loads the record at the
//! start of an update and rewrites `commit`/`ref` after a successful apply.

pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::{
    API_VERSION, GitOrigin, KIND, Konfigfile, METADATA_FILE, ObjectMeta, Upstream, UpstreamType,
};
