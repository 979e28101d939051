//! Temporary audio artifacts and the in-memory clips read back from them.
//!
//! An [`AudioArtifact`] owns a uniquely named temporary WAV file.  The file
//! is removed when the artifact is dropped, so it cannot outlive the
//! playback request that created it, whichever way that request ends.

use std::path::Path;

use tempfile::TempPath;

/// A uniquely named temporary audio file, deleted on drop.
#[derive(Debug)]
pub struct AudioArtifact {
    path: TempPath,
}

impl AudioArtifact {
    const PREFIX: &'static str = "echoverse-";
    const SUFFIX: &'static str = ".wav";

    /// Reserve a fresh, empty temporary file for a synthesizer to write to.
    pub fn create() -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(Self::PREFIX)
            .suffix(Self::SUFFIX)
            .tempfile()?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Location the synthesizer writes the audio encoding to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the audio into memory and delete the file.
    ///
    /// The file is removed whether or not the read succeeds.  A failed
    /// removal after a successful read is logged, not returned.
    pub fn into_clip(self) -> std::io::Result<AudioClip> {
        let bytes = std::fs::read(&self.path)?;

        let display = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            log::warn!("speech: could not remove {display}: {e}");
        }

        Ok(AudioClip { bytes })
    }
}

/// WAV-encoded audio held in memory for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_get_unique_wav_paths() {
        let a = AudioArtifact::create().unwrap();
        let b = AudioArtifact::create().unwrap();

        assert_ne!(a.path(), b.path());
        for artifact in [&a, &b] {
            let name = artifact.path().file_name().unwrap().to_string_lossy();
            assert!(name.starts_with("echoverse-"), "{name}");
            assert!(name.ends_with(".wav"), "{name}");
        }
    }

    #[test]
    fn into_clip_reads_then_deletes() {
        let artifact = AudioArtifact::create().unwrap();
        std::fs::write(artifact.path(), b"RIFF....WAVE").unwrap();
        let path = artifact.path().to_path_buf();

        let clip = artifact.into_clip().unwrap();
        assert_eq!(clip.bytes, b"RIFF....WAVE");
        assert!(!path.exists());
    }

    #[test]
    fn dropping_deletes_the_file() {
        let artifact = AudioArtifact::create().unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());

        drop(artifact);
        assert!(!path.exists());
    }
}
