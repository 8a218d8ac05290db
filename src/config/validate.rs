// src/config/validate.rs

use std::path::Path;

use globset::GlobBuilder;

use crate::config::model::{BuildConfig, RawBuildConfig};
use crate::errors::{PipelineError, Result};

/// Validate a merged configuration and resolve it against `cwd`.
pub fn validate_config(raw: RawBuildConfig, cwd: &Path) -> Result<BuildConfig> {
    validate_raw_config(&raw)?;
    let config = BuildConfig::new_unchecked(raw, cwd);
    validate_clean_targets(&config)?;
    Ok(config)
}

fn validate_raw_config(cfg: &RawBuildConfig) -> Result<()> {
    validate_roots(cfg)?;
    validate_patterns(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_roots(cfg: &RawBuildConfig) -> Result<()> {
    let roots = [
        ("build.src", &cfg.src),
        ("build.dist", &cfg.dist),
        ("build.temp", &cfg.temp),
        ("build.public", &cfg.public),
    ];

    for (key, value) in roots {
        ensure_non_empty(key, value)?;
    }

    Ok(())
}

/// `clean` removes the temp and dist roots, so neither may be, or contain,
/// a directory holding user input.
fn validate_clean_targets(cfg: &BuildConfig) -> Result<()> {
    let targets = [("build.temp", &cfg.temp_root), ("build.dist", &cfg.dist_root)];
    let inputs = [("build.src", &cfg.source_root), ("build.public", &cfg.public_root)];

    for (target_key, target) in targets {
        for (input_key, input) in inputs {
            if input.starts_with(target) {
                return Err(PipelineError::Config(format!(
                    "{target_key} ({}) contains {input_key} ({}); cleaning would delete it",
                    target.display(),
                    input.display()
                )));
            }
        }
    }

    Ok(())
}

fn validate_patterns(cfg: &RawBuildConfig) -> Result<()> {
    let patterns = [
        ("build.paths.pages", &cfg.paths.pages),
        ("build.paths.scripts", &cfg.paths.scripts),
        ("build.paths.styles", &cfg.paths.styles),
        ("build.paths.images", &cfg.paths.images),
        ("build.paths.fonts", &cfg.paths.fonts),
    ];

    for (key, pattern) in patterns {
        ensure_non_empty(key, pattern)?;
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| PipelineError::Config(format!("{key} is not a valid glob: {e}")))?;
    }

    Ok(())
}

fn validate_server(cfg: &RawBuildConfig) -> Result<()> {
    for (prefix, dir) in cfg.server.routes.iter() {
        if !prefix.starts_with('/') {
            return Err(PipelineError::Config(format!(
                "server.routes key '{prefix}' must start with '/'"
            )));
        }
        ensure_non_empty(&format!("server.routes.\"{prefix}\""), dir)?;
    }
    Ok(())
}

fn ensure_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::Config(format!(
            "{key} must be a non-empty string"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_root_is_rejected() {
        let raw = RawBuildConfig {
            temp: "  ".to_string(),
            ..RawBuildConfig::default()
        };

        match validate_config(raw, Path::new("/p")) {
            Err(PipelineError::Config(msg)) => assert!(msg.contains("build.temp")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn source_root_cannot_be_a_clean_target() {
        let raw = RawBuildConfig {
            dist: "src".to_string(),
            ..RawBuildConfig::default()
        };
        assert!(matches!(
            validate_config(raw, Path::new("/p")),
            Err(PipelineError::Config(_))
        ));
    }

    fn clean_target_error(dist: &str) -> Option<String> {
        let raw = RawBuildConfig {
            dist: dist.to_string(),
            ..RawBuildConfig::default()
        };
        match validate_config(raw, Path::new("/p")) {
            Err(PipelineError::Config(msg)) => Some(msg),
            _ => None,
        }
    }

    #[test]
    fn dotted_spellings_of_the_source_root_are_rejected() {
        for dist in ["./src", "src/", "out/../src"] {
            let msg = clean_target_error(dist).unwrap_or_else(|| panic!("{dist} accepted"));
            assert!(msg.contains("build.dist") && msg.contains("build.src"), "{msg}");
        }
    }

    #[test]
    fn project_root_and_parents_are_rejected_as_clean_targets() {
        assert!(clean_target_error(".").is_some());
        assert!(clean_target_error("..").is_some());
        assert!(clean_target_error("./public").is_some());
        assert!(clean_target_error("./release").is_none());
    }

    #[test]
    fn temp_cannot_contain_public_files() {
        let raw = RawBuildConfig {
            temp: "public/..".to_string(),
            ..RawBuildConfig::default()
        };
        match validate_config(raw, Path::new("/p")) {
            Err(PipelineError::Config(msg)) => assert!(msg.contains("build.temp")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_glob_is_rejected() {
        let mut raw = RawBuildConfig::default();
        raw.paths.scripts = "assets/{scripts/*.js".to_string();

        match validate_config(raw, Path::new("/p")) {
            Err(PipelineError::Config(msg)) => assert!(msg.contains("build.paths.scripts")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
