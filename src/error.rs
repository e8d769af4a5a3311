use thiserror::Error;

use crate::core::{ArtifactId, PlotId};

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid grid cell: height={height}, width={width}, position={position}")]
    InvalidGridCell {
        height: u32,
        width: u32,
        position: u32,
    },

    #[error("invalid cell code {0}: expected a 3-digit HWP value in 111..=999")]
    InvalidCellCode(u32),

    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid limits: {0}")]
    InvalidLimits(String),

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown plot: {0:?}")]
    UnknownPlot(PlotId),

    #[error("unknown artifact: {0:?}")]
    UnknownArtifact(ArtifactId),

    #[error("render backend failure: {0}")]
    Backend(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("scheduler failure: {0}")]
    Scheduler(String),
}
