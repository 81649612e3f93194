use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

/// Zero-padded frame naming: lexical order equals temporal order, which both
/// the upscaler batch and the reassembly pattern rely on.
pub const FRAME_PATTERN: &str = "frame_%08d.png";

/// Exclusively-owned directory holding one job's intermediates.
///
/// The backing `TempDir` removes the whole tree on drop, so teardown happens
/// on every exit path without the pipeline tracking it. Uniqueness comes from
/// the uuid prefix plus tempfile's random suffix, so concurrent jobs on one
/// host never collide.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    pub job_id: Uuid,
}

impl Workspace {
    pub fn create(base: &Path) -> io::Result<Self> {
        fs::create_dir_all(base)?;

        let job_id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(base)?;

        fs::create_dir(dir.path().join("frames"))?;
        fs::create_dir(dir.path().join("upscaled"))?;

        Ok(Self { dir, job_id })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The source video, downloaded or copied in.
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join("src.mp4")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.dir.path().join("frames")
    }

    pub fn upscaled_dir(&self) -> PathBuf {
        self.dir.path().join("upscaled")
    }

    pub fn frame_pattern(&self) -> PathBuf {
        self.frames_dir().join(FRAME_PATTERN)
    }

    pub fn upscaled_pattern(&self) -> PathBuf {
        self.upscaled_dir().join(FRAME_PATTERN)
    }

    /// Encoded frames before the audio mux.
    pub fn video_only_path(&self) -> PathBuf {
        self.dir.path().join("upscaled_noaudio.mp4")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("upscaled.mp4")
    }
}

/// Frame files in `dir`, lexically sorted.
pub fn list_frames(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("frame_") && n.ends_with(".png"))
                .unwrap_or(false)
        })
        .collect();
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_lays_out_directories() {
        let base = tempdir().unwrap();
        let workspace = Workspace::create(base.path()).unwrap();

        assert!(workspace.path().is_dir());
        assert!(workspace.frames_dir().is_dir());
        assert!(workspace.upscaled_dir().is_dir());
        assert!(workspace
            .path()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with(&format!("job-{}-", workspace.job_id)));
    }

    #[test]
    fn test_workspaces_are_unique() {
        let base = tempdir().unwrap();
        let a = Workspace::create(base.path()).unwrap();
        let b = Workspace::create(base.path()).unwrap();

        assert_ne!(a.path(), b.path());
        assert_ne!(a.job_id, b.job_id);
    }

    #[test]
    fn test_drop_removes_directory() {
        let base = tempdir().unwrap();
        let path = {
            let workspace = Workspace::create(base.path()).unwrap();
            fs::write(workspace.source_path(), b"data").unwrap();
            workspace.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("frame_00000002.png"), b"b").unwrap();
        fs::write(dir.path().join("frame_00000001.png"), b"a").unwrap();
        fs::write(dir.path().join("frame_00000010.png"), b"c").unwrap();
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();
        fs::write(dir.path().join("frame_bad.jpg"), b"skip me").unwrap();

        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<&str> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "frame_00000001.png",
                "frame_00000002.png",
                "frame_00000010.png"
            ]
        );
    }

    #[test]
    fn test_list_frames_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(list_frames(dir.path()).unwrap().is_empty());
    }
}
