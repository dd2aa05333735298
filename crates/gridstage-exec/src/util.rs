use std::process::Stdio;

use tokio::process::Command;

use crate::{ProducerArgs, ProducerConfig, utils::limits::attach_rlimits};

/// `<interpreter> <script> <input> <output>` with the configured environment applied.
pub(crate) fn interpreter_command(cfg: &ProducerConfig, args: &ProducerArgs) -> Command {
    let mut cmd = Command::new(&cfg.interpreter);
    cmd.args(args.positional());

    if let Some(cwd) = &cfg.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &cfg.env {
        cmd.env(k, v);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(if cfg.forward_output {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(Stdio::inherit());
    // the child never outlives the `run` call that spawned it
    cmd.kill_on_drop(true);

    attach_rlimits(&mut cmd, &cfg.rlimits);
    cmd
}
