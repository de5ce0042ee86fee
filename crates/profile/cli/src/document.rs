//! Profile documents read from disk.

use std::io::Read;
use std::path::Path;

use profile_types::{ProfileSet, SharedDeclarations};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliResult;

/// A profile set ready to serialize, as exchanged in JSON or YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDocument {
    /// Name of the top-level profile
    pub root: String,

    /// The root profile and all of its hats
    pub profiles: ProfileSet,

    /// Declarations shared by every profile in the root's file
    #[serde(default)]
    pub declarations: Option<SharedDeclarations>,
}

impl ProfileDocument {
    /// Load a document; `-` reads JSON from stdin, `.yaml`/`.yml` files are
    /// YAML, anything else is JSON.
    pub fn load(path: &Path) -> CliResult<Self> {
        if path == Path::new("-") {
            let mut contents = String::new();
            std::io::stdin().read_to_string(&mut contents)?;
            return Ok(serde_json::from_str(&contents)?);
        }

        debug!(path = %path.display(), "Loading profile document");
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&contents)?),
            _ => Ok(serde_json::from_str(&contents)?),
        }
    }
}
