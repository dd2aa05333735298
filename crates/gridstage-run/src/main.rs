//! `gridstage-run <script> <input> <output>`
//!
//! Runs the task interpreter on a worker node and always leaves the completion
//! sentinel behind, unless the command line itself is wrong.
use std::{env, process::ExitCode};

use anyhow::Context;
use tracing::{error, info};

use gridstage_exec::{Producer, ProducerArgs, ProducerConfig};
use gridstage_observe::{LoggerConfig, LoggerFormat, logger_init};

const ENV_INTERPRETER: &str = "GRIDSTAGE_INTERPRETER";
const ENV_LOG: &str = "GRIDSTAGE_LOG";
const ENV_LOG_FORMAT: &str = "GRIDSTAGE_LOG_FORMAT";

fn main() -> ExitCode {
    let args = match ProducerArgs::parse(env::args_os().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("usage: gridstage-run <script> <input> <output> ({e})");
            return ExitCode::FAILURE;
        }
    };

    // a broken logger must not cost us the sentinel
    if let Err(e) = init_logger() {
        eprintln!("gridstage-run: {e:#}");
    }

    let producer = Producer::new(producer_config());
    info!(
        interpreter = %producer.config().interpreter,
        script = %args.script.display(),
        "starting task"
    );

    let code = match run(&producer, &args) {
        Ok(code) => code,
        Err(e) => {
            error!(error = format!("{e:#}"), "interpreter not started");
            if let Err(e) = producer.signal_completion() {
                error!(error = %e, "failed to write completion sentinel");
            }
            1
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run(producer: &Producer, args: &ProducerArgs) -> anyhow::Result<i32> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    Ok(rt.block_on(producer.execute(args)))
}

fn init_logger() -> anyhow::Result<()> {
    let mut cfg = LoggerConfig::default();
    if let Ok(level) = env::var(ENV_LOG) {
        cfg = cfg.with_level(level);
    }
    if let Ok(format) = env::var(ENV_LOG_FORMAT) {
        let format = format
            .parse::<LoggerFormat>()
            .with_context(|| format!("{ENV_LOG_FORMAT}={format}"))?;
        cfg = cfg.with_format(format);
    }
    logger_init(&cfg).context("init logger")
}

fn producer_config() -> ProducerConfig {
    let cfg = ProducerConfig::default();
    match env::var(ENV_INTERPRETER) {
        Ok(interpreter) if !interpreter.is_empty() => cfg.with_interpreter(interpreter),
        _ => cfg,
    }
}
