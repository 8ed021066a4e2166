use std::{
    env, fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::Builder;
use tracing::{debug, instrument, warn};

use crate::{
    error::{CleanupFailure, IoOp, KeyInfoError},
    format, iv,
    random::{OsRandom, RandomSource},
};

/// AES-128 content keys are 16 bytes.
pub const KEY_LEN: usize = 16;

pub const KEY_FILE_PREFIX: &str = "hls_key_";
pub const KEY_FILE_SUFFIX: &str = ".bin";
pub const KEYINFO_FILE_PREFIX: &str = "hls_keyinfo_";
pub const KEYINFO_FILE_SUFFIX: &str = ".txt";

#[derive(Clone, Copy)]
struct ContentKey([u8; KEY_LEN]);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey")
    }
}

/// The path written on the keyinfo key line, tagged with who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFile {
    /// Created by the descriptor and removed on disposal.
    Generated(PathBuf),
    /// Supplied by the caller; never removed by the descriptor.
    External(PathBuf),
    /// Disposed; the key line is empty.
    Released,
}

impl KeyFile {
    pub fn path(&self) -> &Path {
        match self {
            KeyFile::Generated(path) | KeyFile::External(path) => path,
            KeyFile::Released => Path::new(""),
        }
    }
}

/// Artifacts handed over by [`KeyDescriptor::keep`]; the caller now owns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepArtifacts {
    pub key_file: Option<PathBuf>,
    pub keyinfo_file: Option<PathBuf>,
}

/// Random content key plus the keyinfo descriptor ffmpeg needs to use it.
///
/// Construction writes the key to a fresh `hls_key_*.bin` file in the temp
/// directory. Files the descriptor creates are removed by [`dispose`] or, failing
/// that, on drop. Paths supplied through [`set_key_file`] are never removed.
///
/// [`dispose`]: KeyDescriptor::dispose
/// [`set_key_file`]: KeyDescriptor::set_key_file
pub struct KeyDescriptor<R: RandomSource = OsRandom> {
    url: String,
    key_file: KeyFile,
    iv: String,
    key: Option<ContentKey>,
    temp_dir: PathBuf,
    owned_key_file: Option<PathBuf>,
    owned_keyinfo_file: Option<PathBuf>,
    random: R,
}

impl KeyDescriptor<OsRandom> {
    /// Generate a key in the process temp directory.
    pub fn new(url: impl Into<String>) -> Result<Self, KeyInfoError> {
        Self::with_random(url, env::temp_dir(), OsRandom)
    }

    /// Generate a key in `temp_dir` instead of the process temp directory.
    pub fn new_in(
        url: impl Into<String>,
        temp_dir: impl AsRef<Path>,
    ) -> Result<Self, KeyInfoError> {
        Self::with_random(url, temp_dir, OsRandom)
    }
}

impl<R: RandomSource> KeyDescriptor<R> {
    #[instrument(skip_all)]
    pub fn with_random(
        url: impl Into<String>,
        temp_dir: impl AsRef<Path>,
        random: R,
    ) -> Result<Self, KeyInfoError> {
        let mut bytes = [0u8; KEY_LEN];
        random.fill(&mut bytes)?;

        let temp_dir =
            std::path::absolute(temp_dir.as_ref()).map_err(KeyInfoError::io(IoOp::CreateKeyFile))?;
        let path = write_key_file(&temp_dir, &bytes)?;
        debug!(path = %path.display(), "generated key file");

        Ok(Self {
            url: url.into(),
            key_file: KeyFile::Generated(path.clone()),
            iv: String::new(),
            key: Some(ContentKey(bytes)),
            temp_dir,
            owned_key_file: Some(path),
            owned_keyinfo_file: None,
            random,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path written on the key line; empty after disposal.
    pub fn key_file_path(&self) -> &Path {
        self.key_file.path()
    }

    pub fn key_file(&self) -> &KeyFile {
        &self.key_file
    }

    pub fn iv(&self) -> &str {
        &self.iv
    }

    /// Copy of the key bytes.
    pub fn key(&self) -> Option<[u8; KEY_LEN]> {
        self.key.map(|k| k.0)
    }

    /// Keyinfo file created by [`persist_to_temp_file`](Self::persist_to_temp_file), if any.
    pub fn keyinfo_file(&self) -> Option<&Path> {
        self.owned_keyinfo_file.as_deref()
    }

    /// Set the IV verbatim. Empty omits the IV line.
    pub fn set_iv(&mut self, iv: impl Into<String>) -> &mut Self {
        self.iv = iv.into();
        self
    }

    /// Set the IV after checking it is 32 hex digits.
    pub fn try_set_iv(&mut self, iv: impl Into<String>) -> Result<&mut Self, KeyInfoError> {
        let iv = iv.into();
        iv::validate(&iv)?;
        self.iv = iv;
        Ok(self)
    }

    /// Point the key line at another path. The generated key file stays owned
    /// and is still removed on disposal.
    pub fn set_key_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        self.key_file = if self.owned_key_file.as_ref() == Some(&path) {
            KeyFile::Generated(path)
        } else {
            KeyFile::External(path)
        };
        self
    }

    /// Like [`set_key_file`](Self::set_key_file), but the path must be a regular
    /// file holding exactly one key.
    pub fn try_set_key_file(
        &mut self,
        path: impl Into<PathBuf>,
    ) -> Result<&mut Self, KeyInfoError> {
        let path = path.into();
        let invalid = |reason: String| KeyInfoError::InvalidKeyFile {
            path: path.clone(),
            reason,
        };

        let meta = fs::metadata(&path).map_err(|e| invalid(e.to_string()))?;
        if !meta.is_file() {
            return Err(invalid("not a regular file".to_string()));
        }
        if meta.len() != KEY_LEN as u64 {
            return Err(invalid(format!(
                "expected {KEY_LEN} bytes, found {}",
                meta.len()
            )));
        }

        Ok(self.set_key_file(path))
    }

    /// Replace the IV with fresh random bytes.
    pub fn rand_iv(&mut self) -> Result<&mut Self, KeyInfoError> {
        self.iv = iv::generate(&self.random)?;
        Ok(self)
    }

    /// Replace the IV with fresh random bytes, falling back to the all-zero IV
    /// if the random source fails.
    pub fn rand_iv_best_effort(&mut self) -> &mut Self {
        match iv::generate(&self.random) {
            Ok(iv) => self.iv = iv,
            Err(err) => {
                warn!(%err, "random IV unavailable, using zero IV");
                self.iv = iv::ZERO_IV.to_string();
            }
        }
        self
    }

    /// Serialize the keyinfo lines into `w`, returning the bytes written.
    /// On failure the error carries the count that reached `w` before it.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<u64, KeyInfoError> {
        format::write_lines(w, self.url.as_bytes(), self.key_line(), self.iv_line())
    }

    /// The serialized keyinfo lines.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for line in [Some(self.url.as_bytes()), Some(self.key_line()), self.iv_line()]
            .into_iter()
            .flatten()
        {
            out.extend_from_slice(line);
            out.push(b'\n');
        }
        out
    }

    /// Write the keyinfo to a temp file owned by this descriptor. The first call
    /// creates `hls_keyinfo_*.txt`; later calls rewrite the same file.
    #[instrument(skip_all)]
    pub fn persist_to_temp_file(&mut self) -> Result<PathBuf, KeyInfoError> {
        self.ensure_key()?;

        if let Some(path) = &self.owned_keyinfo_file {
            self.rewrite(path)?;
            debug!(path = %path.display(), "rewrote keyinfo file");
            return Ok(path.clone());
        }

        let mut tmp = Builder::new()
            .prefix(KEYINFO_FILE_PREFIX)
            .suffix(KEYINFO_FILE_SUFFIX)
            .tempfile_in(&self.temp_dir)
            .map_err(KeyInfoError::io(IoOp::CreateKeyInfoFile))?;
        // An early return drops `tmp`, which removes the half-written file.
        self.write_to(&mut tmp)?;
        tmp.as_file()
            .sync_all()
            .map_err(KeyInfoError::io(IoOp::WriteKeyInfoFile))?;
        let (_, path) = tmp.keep().map_err(|e| KeyInfoError::Io {
            op: IoOp::CreateKeyInfoFile,
            source: e.error,
        })?;

        debug!(path = %path.display(), "created keyinfo file");
        self.owned_keyinfo_file = Some(path.clone());
        Ok(path)
    }

    /// Write the keyinfo to `path`, replacing any existing content. The caller
    /// owns the file.
    #[instrument(skip_all)]
    pub fn persist_to_file(&self, path: impl AsRef<Path>) -> Result<(), KeyInfoError> {
        self.ensure_key()?;
        self.rewrite(path.as_ref())
    }

    /// Remove every file this descriptor created. Missing files count as
    /// removed, so calling this twice is fine. All failures are reported together.
    #[instrument(skip_all)]
    pub fn dispose(&mut self) -> Result<(), KeyInfoError> {
        let mut failures = Vec::new();

        if let Some(path) = self.owned_key_file.take() {
            remove_artifact(path, IoOp::RemoveKeyFile, &mut failures);
        }
        if let Some(path) = self.owned_keyinfo_file.take() {
            remove_artifact(path, IoOp::RemoveKeyInfoFile, &mut failures);
        }
        self.key_file = KeyFile::Released;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(KeyInfoError::Cleanup { failures })
        }
    }

    /// Hand the created files over to the caller; nothing is removed on drop.
    pub fn keep(mut self) -> KeepArtifacts {
        KeepArtifacts {
            key_file: self.owned_key_file.take(),
            keyinfo_file: self.owned_keyinfo_file.take(),
        }
    }

    fn ensure_key(&self) -> Result<&ContentKey, KeyInfoError> {
        self.key.as_ref().ok_or(KeyInfoError::KeyNotInitialized)
    }

    fn rewrite(&self, path: &Path) -> Result<(), KeyInfoError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(KeyInfoError::io(IoOp::CreateKeyInfoFile))?;
        self.write_to(&mut file)?;
        file.sync_all()
            .map_err(KeyInfoError::io(IoOp::WriteKeyInfoFile))
    }

    fn key_line(&self) -> &[u8] {
        self.key_file.path().as_os_str().as_encoded_bytes()
    }

    fn iv_line(&self) -> Option<&[u8]> {
        (!self.iv.is_empty()).then(|| self.iv.as_bytes())
    }
}

impl<R: RandomSource> Drop for KeyDescriptor<R> {
    fn drop(&mut self) {
        if self.owned_key_file.is_none() && self.owned_keyinfo_file.is_none() {
            return;
        }
        if let Err(err) = self.dispose() {
            warn!(%err, "cleanup on drop failed");
        }
    }
}

impl<R: RandomSource> fmt::Debug for KeyDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDescriptor")
            .field("url", &self.url)
            .field("key_file", &self.key_file)
            .field("iv", &self.iv)
            .field("keyinfo_file", &self.owned_keyinfo_file)
            .finish_non_exhaustive()
    }
}

fn write_key_file(dir: &Path, key: &[u8; KEY_LEN]) -> Result<PathBuf, KeyInfoError> {
    let mut tmp = Builder::new()
        .prefix(KEY_FILE_PREFIX)
        .suffix(KEY_FILE_SUFFIX)
        .tempfile_in(dir)
        .map_err(KeyInfoError::io(IoOp::CreateKeyFile))?;
    // Dropping `tmp` on any error below deletes the file.
    tmp.write_all(key)
        .map_err(KeyInfoError::io(IoOp::WriteKeyFile))?;
    tmp.as_file()
        .sync_all()
        .map_err(KeyInfoError::io(IoOp::WriteKeyFile))?;
    let (_, path) = tmp.keep().map_err(|e| KeyInfoError::Io {
        op: IoOp::CreateKeyFile,
        source: e.error,
    })?;
    Ok(path)
}

fn remove_artifact(path: PathBuf, op: IoOp, failures: &mut Vec<CleanupFailure>) {
    match fs::remove_file(&path) {
        Ok(()) => debug!(path = %path.display(), %op, "removed temporary file"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => failures.push(CleanupFailure { op, path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::KeyInfoFile,
        random::{FailingRandom, ScriptedRandom},
    };

    const URL: &str = "http://localhost:4123/keyinfo";

    fn descriptor(dir: &Path) -> KeyDescriptor {
        KeyDescriptor::new_in(URL, dir).expect("new descriptor")
    }

    #[test]
    fn new_writes_key_bytes_to_generated_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let desc = descriptor(dir.path());

        let key = desc.key().expect("key present");
        assert_eq!(key.len(), KEY_LEN);
        assert_eq!(fs::read(desc.key_file_path()).expect("read key"), key);
        assert!(matches!(desc.key_file(), KeyFile::Generated(_)));
        assert_eq!(desc.url(), URL);
        assert_eq!(desc.iv(), "");

        let name = desc
            .key_file_path()
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(name.starts_with(KEY_FILE_PREFIX) && name.ends_with(KEY_FILE_SUFFIX));
        assert!(desc.key_file_path().is_absolute());
        assert!(desc.key_file_path().starts_with(dir.path()));
    }

    #[test]
    fn key_returns_independent_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let desc = descriptor(dir.path());

        let mut first = desc.key().expect("key");
        let original = first;
        first[0] ^= 0xFF;
        assert_eq!(desc.key().expect("key"), original);
    }

    #[test]
    fn rand_iv_yields_lowercase_hex() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());

        desc.rand_iv().expect("rand iv");
        assert_eq!(desc.iv().len(), 32);
        assert!(desc.iv().chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn rand_iv_fails_closed_and_best_effort_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        // First draw feeds the key, the next two fail.
        let random = ScriptedRandom::new([Some(7), None, None]);
        let mut desc =
            KeyDescriptor::with_random(URL, dir.path(), random).expect("new descriptor");
        assert_eq!(desc.key(), Some([7u8; KEY_LEN]));

        let err = desc.rand_iv().expect_err("should fail");
        assert!(matches!(err, KeyInfoError::RandomSource { .. }));
        assert_eq!(desc.iv(), "");

        desc.rand_iv_best_effort();
        assert_eq!(desc.iv(), iv::ZERO_IV);
    }

    #[test]
    fn construction_failure_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err =
            KeyDescriptor::with_random(URL, dir.path(), FailingRandom).expect_err("should fail");
        assert!(matches!(err, KeyInfoError::RandomSource { .. }));
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn construction_in_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = KeyDescriptor::new_in(URL, dir.path().join("missing")).expect_err("should fail");
        assert!(matches!(
            err,
            KeyInfoError::Io {
                op: IoOp::CreateKeyFile,
                ..
            }
        ));
    }

    #[test]
    fn write_to_emits_two_lines_without_iv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let desc = descriptor(dir.path());

        let mut out = Vec::new();
        let n = desc.write_to(&mut out).expect("write");
        let expected = format!("{URL}\n{}\n", desc.key_file_path().display());
        assert_eq!(String::from_utf8(out).expect("utf8"), expected);
        assert_eq!(n, expected.len() as u64);
    }

    #[test]
    fn write_to_emits_three_lines_with_iv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        desc.set_iv("12345678901234567890123456789012");

        let mut out = Vec::new();
        let n = desc.write_to(&mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.split_terminator('\n').collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], URL);
        assert_eq!(lines[1], desc.key_file_path().to_str().expect("utf8 path"));
        assert_eq!(lines[2], "12345678901234567890123456789012");
        assert!(text.ends_with("12345678901234567890123456789012\n"));
        assert_eq!(n, text.len() as u64);
        assert_eq!(desc.to_bytes(), text.as_bytes());
    }

    #[test]
    fn persist_to_file_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        let target = dir.path().join("test_keyinfo.txt");

        desc.set_iv("abcdef1234567890abcdef1234567890");
        desc.persist_to_file(&target).expect("persist");
        let parsed = KeyInfoFile::read_from(&target).expect("read back");
        assert_eq!(parsed.url, URL);
        assert_eq!(parsed.key_file, desc.key_file_path());
        assert_eq!(parsed.iv.as_deref(), Some("abcdef1234567890abcdef1234567890"));

        desc.set_iv("");
        desc.persist_to_file(&target).expect("persist again");
        let parsed = KeyInfoFile::read_from(&target).expect("read back");
        assert_eq!(parsed.iv, None);

        desc.dispose().expect("dispose");
        assert!(target.exists(), "caller-owned keyinfo must survive dispose");
    }

    #[test]
    fn persist_to_temp_file_reuses_recorded_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());

        desc.set_iv("abcdef1234567890abcdef1234567890");
        let first = desc.persist_to_temp_file().expect("persist");
        desc.set_iv("111222333444555666777888999000aa");
        let second = desc.persist_to_temp_file().expect("persist again");

        assert_eq!(first, second);
        assert_eq!(desc.keyinfo_file(), Some(first.as_path()));
        let name = first.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with(KEYINFO_FILE_PREFIX) && name.ends_with(KEYINFO_FILE_SUFFIX));

        let parsed = KeyInfoFile::read_from(&first).expect("read back");
        assert_eq!(parsed.iv.as_deref(), Some("111222333444555666777888999000aa"));
        // key file + one keyinfo file
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 2);

        desc.dispose().expect("dispose");
        assert!(!first.exists());
    }

    #[test]
    fn dispose_is_idempotent_and_clears_key_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        let key_file = desc.key_file_path().to_path_buf();
        desc.persist_to_temp_file().expect("persist");

        desc.dispose().expect("dispose");
        desc.dispose().expect("dispose again");

        assert!(!key_file.exists());
        assert_eq!(desc.key_file_path(), Path::new(""));
        assert_eq!(desc.key_file(), &KeyFile::Released);
        assert_eq!(desc.keyinfo_file(), None);
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn dispose_aggregates_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        let blocked_key = dir.path().join("blocked-key");
        let blocked_info = dir.path().join("blocked-info");
        fs::create_dir(&blocked_key).expect("mkdir");
        fs::create_dir(&blocked_info).expect("mkdir");
        desc.owned_key_file = Some(blocked_key);
        desc.owned_keyinfo_file = Some(blocked_info);

        let err = desc.dispose().expect_err("directories cannot be removed as files");
        match err {
            KeyInfoError::Cleanup { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].op, IoOp::RemoveKeyFile);
                assert_eq!(failures[1].op, IoOp::RemoveKeyInfoFile);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(desc.key_file_path(), Path::new(""));
        desc.dispose().expect("nothing left to remove");
    }

    #[test]
    fn superseded_key_file_is_still_removed_and_external_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let external = dir.path().join("external.key");
        fs::write(&external, [1u8; KEY_LEN]).expect("write external key");

        let mut desc = descriptor(dir.path());
        let generated = desc.key_file_path().to_path_buf();
        desc.set_key_file(&external).set_iv("00112233445566778899aabbccddeeff");
        assert_eq!(desc.key_file(), &KeyFile::External(external.clone()));

        let text = String::from_utf8(desc.to_bytes()).expect("utf8");
        assert!(text.contains(external.to_str().expect("utf8 path")));

        desc.dispose().expect("dispose");
        assert!(!generated.exists());
        assert!(external.exists());
    }

    #[test]
    fn setting_generated_path_back_restores_ownership_tag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        let generated = desc.key_file_path().to_path_buf();

        desc.set_key_file("/elsewhere/key.bin").set_key_file(&generated);
        assert_eq!(desc.key_file(), &KeyFile::Generated(generated));
    }

    #[test]
    fn validating_setters_reject_bad_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());

        assert!(matches!(
            desc.try_set_iv("not-hex"),
            Err(KeyInfoError::InvalidIv { .. })
        ));
        assert_eq!(desc.iv(), "");
        desc.try_set_iv("00112233445566778899AABBCCDDEEFF")
            .expect("valid iv");

        let short = dir.path().join("short.key");
        fs::write(&short, [0u8; 4]).expect("write");
        assert!(matches!(
            desc.try_set_key_file(&short),
            Err(KeyInfoError::InvalidKeyFile { .. })
        ));
        assert!(matches!(
            desc.try_set_key_file(dir.path()),
            Err(KeyInfoError::InvalidKeyFile { .. })
        ));
        assert!(matches!(
            desc.try_set_key_file(dir.path().join("missing.key")),
            Err(KeyInfoError::InvalidKeyFile { .. })
        ));
        assert!(matches!(desc.key_file(), KeyFile::Generated(_)));

        let good = dir.path().join("good.key");
        fs::write(&good, [9u8; KEY_LEN]).expect("write");
        desc.try_set_key_file(&good).expect("valid key file");
        assert_eq!(desc.key_file_path(), good);
    }

    #[test]
    fn unvalidated_setter_emits_iv_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        desc.set_iv("not really an iv");

        let text = String::from_utf8(desc.to_bytes()).expect("utf8");
        assert!(text.ends_with("\nnot really an iv\n"));
    }

    #[test]
    fn independent_descriptors_do_not_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = descriptor(dir.path());
        let b = descriptor(dir.path());

        assert_ne!(a.key_file_path(), b.key_file_path());
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn drop_removes_owned_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut desc = descriptor(dir.path());
            desc.persist_to_temp_file().expect("persist");
        }
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn keep_hands_files_to_caller() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        let keyinfo = desc.persist_to_temp_file().expect("persist");
        let key_file = desc.key_file_path().to_path_buf();

        let kept = desc.keep();
        assert_eq!(kept.key_file.as_deref(), Some(key_file.as_path()));
        assert_eq!(kept.keyinfo_file.as_deref(), Some(keyinfo.as_path()));
        assert!(key_file.exists());
        assert!(keyinfo.exists());
    }

    #[test]
    fn file_output_requires_key_material() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut desc = descriptor(dir.path());
        desc.key = None;

        assert_eq!(desc.key(), None);
        assert!(matches!(
            desc.persist_to_temp_file(),
            Err(KeyInfoError::KeyNotInitialized)
        ));
        assert!(matches!(
            desc.persist_to_file(dir.path().join("out.txt")),
            Err(KeyInfoError::KeyNotInitialized)
        ));
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn debug_output_hides_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let desc = descriptor(dir.path());
        let key = desc.key().expect("key");

        let rendered = format!("{desc:?}");
        assert!(!rendered.contains(&format!("{:?}", key)));
        assert!(!rendered.contains(&hex::encode(key)));
    }
}
