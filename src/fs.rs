use std::io;
use std::path::Path;
use tokio::fs::{copy, create_dir, write};

/// Name of the file git reads ignore rules from
pub const IGNORE_FILE: &str = ".gitignore";

/// Creates the project directory. Unlike `create_dir_all` this fails
/// with `AlreadyExists` when anything is already at the path so an
/// existing project is never merged into
pub async fn create_project_directory(path: impl AsRef<Path>) -> io::Result<()> {
    create_dir(path).await
}

/// Copies the template document to `destination` returning the
/// number of bytes copied
pub async fn copy_template(template: impl AsRef<Path>, destination: impl AsRef<Path>) -> io::Result<u64> {
    copy(template, destination).await
}

/// Writes the ignore file into `dir` containing the single `pattern`
pub async fn write_ignore_file(dir: impl AsRef<Path>, pattern: &str) -> io::Result<()> {
    write(dir.as_ref().join(IGNORE_FILE), format!("{pattern}\n")).await
}

#[cfg(test)]
mod test {
    use crate::fs::{copy_template, create_project_directory, write_ignore_file, IGNORE_FILE};
    use std::io::ErrorKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn existing_directory_is_not_reused() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("Alpha");
        create_project_directory(&path).await.unwrap();

        let err = create_project_directory(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn template_is_copied_byte_for_byte() {
        let root = TempDir::new().unwrap();
        let template = root.path().join("template.blend");
        std::fs::write(&template, b"BLENDER-v300\x00\x01").unwrap();

        let destination = root.path().join("Alpha.blend");
        let copied = copy_template(&template, &destination).await.unwrap();

        assert_eq!(copied, 14);
        assert_eq!(std::fs::read(destination).unwrap(), b"BLENDER-v300\x00\x01");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let root = TempDir::new().unwrap();
        let err = copy_template(root.path().join("template.blend"), root.path().join("out.blend"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!root.path().join("out.blend").exists());
    }

    #[tokio::test]
    async fn ignore_file_has_one_line() {
        let root = TempDir::new().unwrap();
        write_ignore_file(root.path(), "*.blend1").await.unwrap();
        let contents = std::fs::read_to_string(root.path().join(IGNORE_FILE)).unwrap();
        assert_eq!(contents, "*.blend1\n");
    }
}
