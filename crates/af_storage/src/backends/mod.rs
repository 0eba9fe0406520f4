pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemStore;
pub use memory::MemoryStore;

use af_core::{Error, Result};

/// Document names are plain file names; anything that could escape the
/// store's root is refused.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::Storage(format!("invalid document name: {:?}", name)));
    }
    Ok(())
}
