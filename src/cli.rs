use std::path::PathBuf;

use clap::Parser;

use crate::build_info::BuildInfo;

#[derive(Parser, Debug, Default)]
#[command(
    name = "scanlens",
    version = BuildInfo::version(),
    long_version = BuildInfo::detailed_info(),
    about = "Medical image viewer with remote object detection overlay"
)]
pub struct Args {
    /// Image to open on startup (required with --headless)
    pub file: Option<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Override the detection service URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the detection service API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Run load, capture and detect without opening a window
    #[arg(long, requires = "file")]
    pub headless: bool,

    /// With --headless, print detections and display boxes as JSON
    #[arg(long, requires = "headless")]
    pub json: bool,

    /// Write the effective settings (including overrides) back to disk
    #[arg(long)]
    pub write_settings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_headless_with_overrides() {
        let args = Args::try_parse_from([
            "scanlens",
            "scan.png",
            "--headless",
            "--json",
            "--endpoint",
            "http://localhost:9001/model/1",
            "--api-key",
            "secret",
        ])
        .unwrap();

        assert_eq!(args.file, Some(PathBuf::from("scan.png")));
        assert!(args.headless && args.json);
        assert_eq!(args.endpoint.as_deref(), Some("http://localhost:9001/model/1"));
        assert_eq!(args.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_headless_requires_file() {
        assert!(Args::try_parse_from(["scanlens", "--headless"]).is_err());
        assert!(Args::try_parse_from(["scanlens", "scan.png", "--json"]).is_err());
    }
}
