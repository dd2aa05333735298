//! POSIX rlimits for the interpreter process.
//!
//! On Unix the limits are installed in a `pre_exec` hook, i.e. in the child after
//! `fork()` and before `execve()`, so the interpreter never runs unrestricted.
//! Elsewhere a non-empty configuration is logged and ignored.
use serde::Deserialize;
use tokio::process::Command;
#[cfg(not(unix))]
use tracing::warn;

/// Declarative limits for the interpreter. `None` leaves the inherited limit alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RlimitConfig {
    /// `RLIMIT_NOFILE`.
    pub max_open_files: Option<u64>,

    /// `RLIMIT_FSIZE`. Growing a file past it raises `SIGXFSZ` in the child.
    pub max_file_size_bytes: Option<u64>,

    /// `RLIMIT_CPU`, in seconds. The kernel sends `SIGXCPU` once it is used up.
    pub max_cpu_seconds: Option<u64>,

    /// `RLIMIT_CORE = 0`.
    pub disable_core_dumps: bool,
}

impl RlimitConfig {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_open_files.is_none()
            && self.max_file_size_bytes.is_none()
            && self.max_cpu_seconds.is_none()
            && !self.disable_core_dumps
    }
}

/// Install `config` on `cmd`. No-op for an empty config.
pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
    if config.is_empty() {
        return;
    }

    #[cfg(unix)]
    {
        unix_impl::attach_rlimits(cmd, config);
    }

    #[cfg(not(unix))]
    {
        let _ = cmd;
        warn!(
            target: "gridstage.exec.limits",
            ?config,
            "rlimits are not supported on this OS; ignoring"
        );
    }
}

#[cfg(unix)]
mod unix_impl {
    use std::io;

    use tokio::process::Command;

    use super::RlimitConfig;

    pub fn attach_rlimits(cmd: &mut Command, config: &RlimitConfig) {
        let limits: Vec<(libc::c_int, u64)> = [
            (libc::RLIMIT_NOFILE as libc::c_int, config.max_open_files),
            (libc::RLIMIT_FSIZE as libc::c_int, config.max_file_size_bytes),
            (libc::RLIMIT_CPU as libc::c_int, config.max_cpu_seconds),
            (
                libc::RLIMIT_CORE as libc::c_int,
                config.disable_core_dumps.then_some(0),
            ),
        ]
        .into_iter()
        .filter_map(|(resource, value)| value.map(|v| (resource, v)))
        .collect();

        // SAFETY: the hook only calls async-signal-safe `setrlimit` on values
        // captured before fork.
        unsafe {
            cmd.pre_exec(move || {
                for &(resource, value) in &limits {
                    apply_rlimit(resource, value)?;
                }
                Ok(())
            });
        }
    }

    fn apply_rlimit(resource: libc::c_int, value: u64) -> io::Result<()> {
        let rlim = libc::rlimit {
            rlim_cur: value as libc::rlim_t,
            rlim_max: value as libc::rlim_t,
        };

        let rc = unsafe { libc::setrlimit(resource as _, &rlim) };
        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}
