//! Child environment derivation.
//!
//! The child's environment is a snapshot of the host environment with
//! overrides applied to the copy. The host process environment is never
//! modified.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Variable pointing simulations at the project root.
pub const ROOT_ENV_VAR: &str = "INET_ROOT";

/// Ordered environment map handed to the child.
pub type EnvMap = BTreeMap<OsString, OsString>;

/// Snapshot the current process environment.
pub fn host_snapshot() -> EnvMap {
    std::env::vars_os().collect()
}

/// Copy `base` and set `ROOT_ENV_VAR` to `root`, replacing any previous value.
pub fn with_project_root(base: &EnvMap, root: &Path) -> EnvMap {
    let mut env = base.clone();
    env.insert(OsString::from(ROOT_ENV_VAR), root.as_os_str().to_owned());
    env
}

/// Look up `key` in `env`.
pub fn lookup<'a>(env: &'a EnvMap, key: &str) -> Option<&'a OsStr> {
    env.get(OsStr::new(key)).map(OsString::as_os_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn root_is_added() {
        let base = env_of(&[("PATH", "/usr/bin")]);
        let env = with_project_root(&base, Path::new("/work/inet"));
        assert_eq!(lookup(&env, ROOT_ENV_VAR), Some(OsStr::new("/work/inet")));
        assert_eq!(lookup(&env, "PATH"), Some(OsStr::new("/usr/bin")));
    }

    #[test]
    fn existing_root_is_overridden_in_copy_only() {
        let base = env_of(&[(ROOT_ENV_VAR, "/stale"), ("HOME", "/home/sim")]);
        let env = with_project_root(&base, Path::new("/work/inet"));

        assert_eq!(lookup(&env, ROOT_ENV_VAR), Some(OsStr::new("/work/inet")));
        assert_eq!(lookup(&base, ROOT_ENV_VAR), Some(OsStr::new("/stale")));
        assert_eq!(env.len(), base.len());
    }

    #[test]
    fn snapshot_matches_host() {
        let snapshot = host_snapshot();
        for (key, _) in std::env::vars_os() {
            assert!(snapshot.contains_key(&key), "missing {key:?}");
        }
    }
}
