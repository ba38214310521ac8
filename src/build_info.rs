/// Build information captured at compile time by build.rs
pub struct BuildInfo;

impl BuildInfo {
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// YYYYMMDD.HHMMSS
    pub fn build_timestamp() -> &'static str {
        env!("BUILD_TIMESTAMP")
    }

    /// Short form for the window title
    pub fn display_version() -> String {
        format!("{} ({})", Self::version(), Self::build_timestamp())
    }

    /// Multi-line form for `--version` and the debug log header
    pub fn detailed_info() -> &'static str {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nBuild: ",
            env!("BUILD_TIMESTAMP"),
            "\nCommit: ",
            env!("GIT_HASH_SHORT"),
            "\nPlatform: ",
            env!("TARGET_PLATFORM"),
            "\nProfile: ",
            env!("BUILD_PROFILE")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_info_lists_build_fields() {
        let info = BuildInfo::detailed_info();
        assert!(info.starts_with(BuildInfo::version()));
        assert!(info.contains(BuildInfo::build_timestamp()));
        assert!(info.contains("\nCommit: "));
        assert!(info.contains("\nPlatform: "));
    }

    #[test]
    fn test_display_version() {
        assert!(BuildInfo::display_version().starts_with(BuildInfo::version()));
    }
}
