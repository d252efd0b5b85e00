//! Handling for directories that cannot be listed.

use std::path::Path;

use pathwalk_core::HookError;

/// Called when a directory listing is denied.
///
/// The walker calls the hook at most once per inaccessible directory and
/// retries the listing once when the hook returns `Ok`, so a hook may try to
/// fix permissions. Returning an error stops the walk: the error is yielded
/// as [`WalkError::Hook`](pathwalk_core::WalkError::Hook) and nothing follows.
pub trait PermissionHook {
    /// Handle a denied listing of `path`.
    fn on_permission_denied(&mut self, path: &Path) -> Result<(), HookError>;
}

impl<F> PermissionHook for F
where
    F: FnMut(&Path) -> Result<(), HookError>,
{
    fn on_permission_denied(&mut self, path: &Path) -> Result<(), HookError> {
        self(path)
    }
}

/// Default hook: logs the denied path and carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPermissionErrors;

impl PermissionHook for LogPermissionErrors {
    fn on_permission_denied(&mut self, path: &Path) -> Result<(), HookError> {
        tracing::warn!(path = %path.display(), "Non handled permission error");
        Ok(())
    }
}
