use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSettings {
    /// Directory holding the delimited files to score.
    pub input_dir: PathBuf,
    /// Accumulated audit log written by `score` and read by `offload`.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Rows read per input file; all rows when unset.
    #[serde(default)]
    pub row_limit: Option<usize>,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("./log.csv")
}

fn default_delimiter() -> char {
    ','
}
