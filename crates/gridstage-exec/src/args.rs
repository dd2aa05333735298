use std::{ffi::OsString, path::PathBuf};

use crate::error::ExecError;

/// The three positional locators handed to the interpreter, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerArgs {
    pub script: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ProducerArgs {
    pub fn new(
        script: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            script: script.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    /// Parse positional arguments (program name already stripped).
    ///
    /// Exactly three are required.
    pub fn parse<I, S>(args: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match <[OsString; 3]>::try_from(args) {
            Ok([script, input, output]) => Ok(Self::new(script, input, output)),
            Err(args) => Err(ExecError::Usage { got: args.len() }),
        }
    }

    pub(crate) fn positional(&self) -> [&PathBuf; 3] {
        [&self.script, &self.input, &self.output]
    }
}
