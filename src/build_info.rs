use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = match option_env!("BUILD_COMMIT") {
    Some(c) => c,
    None => "unknown",
};
pub const BUILD_DATE: &str = match option_env!("BUILD_DATE") {
    Some(d) => d,
    None => "unknown",
};

/// Version, commit and build date, e.g. `0.1.0 (commit: abc123, built: 2026-01-01)`.
pub fn version_string() -> String {
    format!("{VERSION} (commit: {COMMIT}, built: {BUILD_DATE})")
}

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_date: &'static str,
}

impl BuildInfo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: VERSION,
            commit: COMMIT,
            build_date: BUILD_DATE,
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_fields_are_populated() {
        let info = BuildInfo::default();
        assert_eq!(info.version, VERSION);
        assert!(!info.commit.is_empty());
        assert!(!info.build_date.is_empty());
    }

    #[test]
    fn version_string_format() {
        let vs = version_string();
        assert!(vs.starts_with(VERSION));
        assert!(vs.contains("commit:"));
        assert!(vs.contains("built:"));
    }
}
