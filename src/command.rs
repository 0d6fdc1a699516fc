//! A validated request to run the pipeline.
//!
//! Front ends collect paths however they like (arguments, folder pickers) and
//! hand them to [`CompressCommand::new`]. Executing the command returns a typed
//! result; rendering it is the front end's job.

use crate::config::PipelineConfig;
use crate::imaging::ImageBackend;
use crate::pipeline::{Pipeline, PipelineError, RunReport};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No source directory selected")]
    MissingSource,
    #[error("No target directory selected")]
    MissingTarget,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone)]
pub struct CompressCommand {
    source: PathBuf,
    target: PathBuf,
    config: PipelineConfig,
}

impl CompressCommand {
    /// Both paths are optional at the input side because a picker can be
    /// cancelled; a command only exists once both are present.
    pub fn new(
        source: Option<PathBuf>,
        target: Option<PathBuf>,
        config: PipelineConfig,
    ) -> Result<Self, CommandError> {
        let source = source.ok_or(CommandError::MissingSource)?;
        let target = target.ok_or(CommandError::MissingTarget)?;
        Ok(Self {
            source,
            target,
            config,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Run with the production image backend.
    pub fn execute(&self) -> Result<RunReport, CommandError> {
        let pipeline = Pipeline::new(self.config.clone());
        Ok(pipeline.run(&self.source, &self.target)?)
    }

    pub fn execute_with<B: ImageBackend>(&self, backend: B) -> Result<RunReport, CommandError> {
        let pipeline = Pipeline::with_backend(backend, self.config.clone());
        Ok(pipeline.run(&self.source, &self.target)?)
    }
}
