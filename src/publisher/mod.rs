use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::models::Topology;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to encode publisher args: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Values handed to the speaker config templating step
#[derive(Debug, Serialize)]
pub struct PublisherArgs<'a> {
    #[serde(rename = "Hostname")]
    pub hostname: &'a str,
    #[serde(rename = "RouterID")]
    pub router_id: &'a str,
    #[serde(rename = "Topology")]
    pub topology: &'a Topology,
}

/// Receives every new topology before the worker does
pub trait Publisher: Send {
    fn update(&mut self, args: &PublisherArgs) -> Result<(), PublishError>;
}

/// Writes the publisher args as JSON for an external renderer to pick up
#[derive(Debug)]
pub struct FilePublisher {
    path: PathBuf,
}

impl FilePublisher {
    /// Fails if the parent directory of `path` does not exist
    pub fn new(path: &Path) -> Result<Self, PublishError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(PublishError::Io {
                    path: parent.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "directory does not exist"),
                });
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn io_error(&self, source: io::Error) -> PublishError {
        PublishError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Publisher for FilePublisher {
    fn update(&mut self, args: &PublisherArgs) -> Result<(), PublishError> {
        let contents = serde_json::to_vec_pretty(args)?;
        // Write aside and rename so readers never see a partial file
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, &contents).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;
        debug!("Published topology to {}", self.path.display());
        Ok(())
    }
}
