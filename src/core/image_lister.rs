use crate::error::Result;
use std::path::Path;
use tokio::fs;

/// Extensions shown in the grid. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// True when `path` holds file content, directly or through a symlink.
/// Directories, dangling links and missing paths are not.
pub async fn is_file_entry(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Lists the unlabeled images sitting directly in `dir`, sorted by name.
/// Subdirectories (label folders) and other files are skipped.
pub async fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut images = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        // Non UTF-8 names cannot round-trip through the form, skip them
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };

        if is_image_name(&name) && is_file_entry(&entry.path()).await {
            images.push(name);
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extension_allow_list() {
        assert!(is_image_name("cat.png"));
        assert!(is_image_name("a.b.jpeg"));
        assert!(is_image_name("x.webp"));
        assert!(!is_image_name("cat.PNG"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name("png"));
        assert!(!is_image_name(".png"));
    }

    #[tokio::test]
    async fn test_lists_only_images_sorted() {
        let dir = tempdir().unwrap();
        for name in ["dog.jpg", "cat.png", "zebra.gif", "readme.txt", "UPPER.JPG", "b.bmp"] {
            fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        fs::create_dir(dir.path().join("folder.png")).await.unwrap();
        fs::create_dir(dir.path().join("A")).await.unwrap();
        fs::write(dir.path().join("A").join("inside.png"), b"x").await.unwrap();

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(images, vec!["b.bmp", "cat.png", "dog.jpg", "zebra.gif"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_links_count_only_when_they_reach_a_file() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.png"), b"x").await.unwrap();
        fs::create_dir(dir.path().join("A")).await.unwrap();
        symlink(dir.path().join("real.png"), dir.path().join("link.png")).unwrap();
        symlink(dir.path().join("A"), dir.path().join("folder.jpg")).unwrap();
        symlink(dir.path().join("gone.png"), dir.path().join("dangling.gif")).unwrap();

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(images, vec!["link.png", "real.png"]);

        assert!(is_file_entry(&dir.path().join("link.png")).await);
        assert!(!is_file_entry(&dir.path().join("A")).await);
        assert!(!is_file_entry(&dir.path().join("dangling.gif")).await);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(list_images(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        assert!(list_images(&dir.path().join("nope")).await.is_err());
    }
}
