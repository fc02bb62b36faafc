use crate::IngestError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

/// Where benchmark output is read from
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub enum Source {
    #[default]
    Stdin,
    Path(PathBuf),
}

impl Source {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(Self::Path).unwrap_or_default()
    }

    /// open the source for line based reading
    pub fn open(&self) -> Result<Box<dyn BufRead>, IngestError> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Self::Path(path) => match File::open(path) {
                Ok(file) => Ok(Box::new(BufReader::new(file))),
                Err(source) => Err(IngestError::Open {
                    path: path.clone(),
                    source,
                }),
            },
        }
    }
}
