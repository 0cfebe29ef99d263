use std::path::Path;
use tracing::debug;

use super::{Collector, FALLBACK};
use crate::collection_log::{CollectionLog, Domain};
use crate::process::CheckRunner;
use crate::results::PerformanceMetrics;

/// Size of the built frontend assets in whole kilobytes.
///
/// Counts regular files directly under `dir`, skipping source maps. `None`
/// when the directory is missing or its files round down to 0 KB.
pub fn measure_bundle_kb(dir: &Path) -> Option<f64> {
    let pattern = format!("{}/*", glob::Pattern::escape(dir.to_str()?));
    let entries = glob::glob(&pattern).ok()?;

    let mut bytes: u64 = 0;
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!("Skipping unreadable asset entry: {}", e);
                continue;
            }
        };
        if path.extension().is_some_and(|ext| ext == "map") {
            continue;
        }
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => bytes += meta.len(),
            Ok(_) => {}
            Err(e) => debug!("Failed to stat {:?}: {}", path, e),
        }
    }

    let kb = (bytes as f64 / 1024.0).round();
    (kb > 0.0).then_some(kb)
}

impl<R: CheckRunner> Collector<R> {
    /// Only the bundle is measurable offline; the rest needs a running app.
    pub(super) fn collect_performance(&self, log: &mut CollectionLog) -> PerformanceMetrics {
        let assets_dir = self.layout.assets_dir();
        let bundle_size = match measure_bundle_kb(&assets_dir) {
            Some(kb) => {
                log.measured(Domain::Performance, format!("bundle: {} KB", kb));
                kb
            }
            None => {
                log.fallback(
                    Domain::Performance,
                    format!(
                        "bundle: no built assets at {:?}, using baseline {} KB",
                        assets_dir, FALLBACK.bundle_size
                    ),
                );
                FALLBACK.bundle_size
            }
        };

        log.fallback(
            Domain::Performance,
            format!(
                "response time: not measured, using baseline {} ms",
                FALLBACK.response_time
            ),
        );
        log.fallback(
            Domain::Performance,
            format!(
                "memory: not measured, using baseline {} MB",
                FALLBACK.memory_usage
            ),
        );
        log.fallback(
            Domain::Performance,
            format!(
                "lighthouse: not measured, using baseline {}",
                FALLBACK.lighthouse_score
            ),
        );

        PerformanceMetrics {
            response_time: FALLBACK.response_time,
            memory_usage: FALLBACK.memory_usage,
            bundle_size,
            lighthouse_score: FALLBACK.lighthouse_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_skips_source_maps() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.js"), vec![b'a'; 3 * 1024]).unwrap();
        std::fs::write(dir.path().join("index.css"), vec![b'b'; 1024]).unwrap();
        std::fs::write(dir.path().join("index.js.map"), vec![b'c'; 50 * 1024]).unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), Some(4.0));
    }

    #[test]
    fn test_bundle_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts").join("a.woff"), vec![0u8; 8 * 1024]).unwrap();
        std::fs::write(dir.path().join("app.js"), vec![0u8; 2048]).unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), Some(2.0));
    }

    #[test]
    fn test_bundle_rounds_to_whole_kilobytes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), vec![0u8; 1536 + 100]).unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), Some(2.0));
    }

    #[test]
    fn test_bundle_under_half_a_kilobyte_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), vec![0u8; 300]).unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), None);

        std::fs::write(dir.path().join("app.css"), vec![0u8; 300]).unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), Some(1.0));
    }

    #[test]
    fn test_bundle_missing_or_empty_dir_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(measure_bundle_kb(dir.path()), None);
        assert_eq!(measure_bundle_kb(&dir.path().join("dist")), None);
    }
}
