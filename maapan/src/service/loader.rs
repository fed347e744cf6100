//! Reconstructed map loading.

use std::path::Path;

use crate::error::EvalError;
use crate::io::map_format;
use crate::map::ReconstructedMap;

/// Source of reconstructed maps for the batch driver.
pub trait MapLoader: Send {
    /// Load the map stored at `path`.
    fn load(&self, path: &Path) -> Result<ReconstructedMap, EvalError>;

    /// Loader name for logging.
    fn name(&self) -> &str;
}

/// Loads maps from JSON map documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMapLoader;

impl MapLoader for JsonMapLoader {
    fn load(&self, path: &Path) -> Result<ReconstructedMap, EvalError> {
        map_format::load_map(path).map_err(|e| EvalError::load(path, e))
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn test_missing_file_is_load_error() {
        let err = JsonMapLoader
            .load(Path::new("/nonexistent/map.json"))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Load);
        assert!(err.to_string().contains("map.json"));
    }
}
