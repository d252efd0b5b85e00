//! Hidden file attribute.

use std::path::Path;

use crate::error::OpsError;

/// Set or clear the hidden attribute of `path`.
///
/// Only Windows has such an attribute; elsewhere this does nothing, since
/// hiding there is a matter of naming.
#[cfg(windows)]
pub fn set_hidden(path: &Path, hidden: bool) -> Result<(), OpsError> {
    use std::process::Command;

    let flag = if hidden { "+h" } else { "-h" };
    let status = Command::new("attrib")
        .arg(flag)
        .arg(path)
        .status()
        .map_err(|e| OpsError::io(path, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(OpsError::Command {
            command: format!("attrib {flag} {}", path.display()),
            status: status.code(),
        })
    }
}

#[cfg(not(windows))]
pub fn set_hidden(path: &Path, hidden: bool) -> Result<(), OpsError> {
    tracing::debug!(
        path = %path.display(),
        hidden,
        "Hidden attribute not supported on this platform"
    );
    Ok(())
}
