//! Resolve which file a command operates on and the workspace containing it.

use std::path::Path;

use crate::app::host::Host;
use crate::domain::errors::RevsightError;
use crate::domain::model::FileContext;
use crate::infra::git::discover_root;

/// Use `explicit` when given, otherwise the host's focused document.
pub fn resolve_context(
    explicit: Option<&Path>,
    host: &dyn Host,
) -> Result<FileContext, RevsightError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => host.focused_file().ok_or(RevsightError::NoFileSelected)?,
    };

    let absolute_path = path
        .canonicalize()
        .map_err(|_| RevsightError::NotInWorkspace(path.clone()))?;
    if absolute_path.is_dir() {
        return Err(RevsightError::NoFileSelected);
    }

    let workspace_root =
        discover_root(&absolute_path).ok_or_else(|| RevsightError::NotInWorkspace(path.clone()))?;
    let context = FileContext {
        absolute_path,
        workspace_root,
    };
    if context.relative_path().is_none() {
        return Err(RevsightError::NotInWorkspace(path));
    }
    Ok(context)
}
