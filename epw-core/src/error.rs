use std::path::PathBuf;

use thiserror::Error;

use crate::display::ChartId;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{chart} chart could not be drawn: {message}")]
    Draw { chart: ChartId, message: String },

    #[error("{chart} chart could not be encoded: {source}")]
    Encode {
        chart: ChartId,
        #[source]
        source: serde_json::Error,
    },

    #[error("{chart} chart could not be written to {}: {source}", .path.display())]
    Io {
        chart: ChartId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub fn chart(&self) -> ChartId {
        match self {
            RenderError::Draw { chart, .. }
            | RenderError::Encode { chart, .. }
            | RenderError::Io { chart, .. } => *chart,
        }
    }
}
