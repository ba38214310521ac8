use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use log::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    DialogClosed,
    InvalidExtension,
    ReadFailed(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DialogClosed => write!(f, "No file selected"),
            Error::InvalidExtension => write!(f, "Unsupported file type"),
            Error::ReadFailed(e) => write!(f, "Failed to read file: {}", e),
        }
    }
}

pub fn get_filename(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|os_str| os_str.to_str())
        .map(|s| s.to_string())
}

/// Case-insensitive extension check against the configured list
pub fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

pub async fn pick_file(extensions: Vec<String>) -> Result<PathBuf, Error> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Open Image")
        .add_filter("Images", extensions.as_slice())
        .pick_file()
        .await;

    match handle {
        Some(file) => {
            let path = file.path().to_path_buf();
            if has_supported_extension(&path, &extensions) {
                Ok(path)
            } else {
                warn!("Rejected {}: unsupported extension", path.display());
                Err(Error::InvalidExtension)
            }
        }
        None => Err(Error::DialogClosed),
    }
}

pub async fn read_file(path: PathBuf) -> Result<Vec<u8>, Error> {
    debug!("Reading {}", path.display());
    tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        Error::ReadFailed(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string()]
    }

    #[test]
    fn test_get_filename() {
        assert_eq!(get_filename(Path::new("/data/scans/chest.png")), Some("chest.png".to_string()));
        assert_eq!(get_filename(Path::new("/")), None);
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("scan.PNG"), &extensions()));
        assert!(has_supported_extension(Path::new("scan.jpg"), &extensions()));
        assert!(!has_supported_extension(Path::new("scan.dcm"), &extensions()));
        assert!(!has_supported_extension(Path::new("scan"), &extensions()));
    }

    #[test]
    fn test_default_extensions_accept_dicom() {
        let defaults: Vec<String> = crate::config::DEFAULT_FILE_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        assert!(has_supported_extension(Path::new("/scans/chest.dcm"), &defaults));
        assert!(has_supported_extension(Path::new("/scans/chest.png"), &defaults));
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        assert_eq!(read_file(path).await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            read_file(dir.path().join("missing.png")).await,
            Err(Error::ReadFailed(_))
        ));
    }
}
