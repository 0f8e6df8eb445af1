//! Where mail-checker looks for its settings file.

use std::path::{Path, PathBuf};

use either::Either;

/// Directory name under the per-user and system config roots.
pub const APP_DIR: &str = "mail-checker";

/// Accepted settings file names, preferred first.
pub const FILE_NAMES: [&str; 2] = ["settings.yaml", "settings.yml"];

/// System-wide config root.
const SYSTEM_ROOT: &str = "/etc";

fn files_in(dir: PathBuf) -> impl Iterator<Item = PathBuf> {
    FILE_NAMES.into_iter().map(move |name| dir.join(name))
}

/// Settings file candidates rooted at `cwd`, then the per-user config dir,
/// then a dotted dir in the home dir, then `/etc`.
///
/// Relative candidates resolve against `cwd`, so a settings file next to
/// where the checker is started wins.
pub fn candidates(cwd: Option<&Path>) -> impl Iterator<Item = PathBuf> + use<> {
    let local = cwd.map(Path::to_path_buf).into_iter().flat_map(files_in);
    let user = dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .into_iter()
        .flat_map(files_in);
    let home = dirs::home_dir()
        .map(|dir| dir.join(format!(".{APP_DIR}")))
        .into_iter()
        .flat_map(files_in);
    let system = files_in(Path::new(SYSTEM_ROOT).join(APP_DIR));

    local.chain(user).chain(home).chain(system)
}

/// The default candidates, starting from the current directory.
pub fn defaults() -> impl Iterator<Item = PathBuf> {
    candidates(std::env::current_dir().ok().as_deref())
}

/// An explicit path is the only candidate when present; otherwise the
/// defaults apply.
pub fn resolve(explicit: Option<PathBuf>) -> impl Iterator<Item = PathBuf> {
    match explicit {
        Some(path) => Either::Left(std::iter::once(path)),
        None => Either::Right(defaults()),
    }
}
