use std::{
    fs, io,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use hlskey_core::{
    descriptor::{KEYINFO_FILE_PREFIX, KEY_FILE_PREFIX},
    KeyDescriptor, KeyFile, KeyInfoFile,
};
use tracing::{debug, info, warn};

use crate::{cli::GenerateArgs, config::Config};

/// Files left on disk by `generate`; the caller removes them with `clean`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub keyinfo: PathBuf,
    pub key_file: PathBuf,
}

/// Create a key and keyinfo, then hand both over to the caller.
pub fn generate(args: GenerateArgs, config: &Config) -> Result<Generated> {
    let url = args.url.or_else(|| config.url.clone()).ok_or_else(|| {
        color_eyre::eyre::eyre!("no key URL given; pass one or set `url` in the config file")
    })?;

    // Until `keep` below, any early return drops `desc` and removes what it created.
    let mut desc = match &config.temp_dir {
        Some(dir) => KeyDescriptor::new_in(url, dir)?,
        None => KeyDescriptor::new(url)?,
    };

    if let Some(iv) = args.iv {
        desc.try_set_iv(iv)?;
    } else if args.rand_iv || config.rand_iv {
        desc.rand_iv()?;
    }
    if let Some(path) = args.key_file {
        desc.try_set_key_file(path)?;
    }

    let keyinfo = match &args.output {
        Some(path) => {
            desc.persist_to_file(path)?;
            path.clone()
        }
        None => desc.persist_to_temp_file()?,
    };

    let key_file = desc.key_file_path().to_path_buf();
    let external = matches!(desc.key_file(), KeyFile::External(_));
    let kept = desc.keep();

    if external {
        if let Some(unused) = kept.key_file {
            fs::remove_file(&unused)?;
            debug!(path = %unused.display(), "removed unused generated key");
        }
    }

    info!(keyinfo = %keyinfo.display(), "keyinfo ready");
    Ok(Generated { keyinfo, key_file })
}

/// Remove a keyinfo file and the key it references. Only files carrying the
/// generated name prefixes are touched; anything else is reported and left alone.
/// Returns the paths actually removed.
pub fn clean(keyinfo: &Path) -> Result<Vec<PathBuf>> {
    let parsed = KeyInfoFile::read_from(keyinfo)?;
    let mut removed = Vec::new();

    for (path, prefix) in [
        (parsed.key_file.as_path(), KEY_FILE_PREFIX),
        (keyinfo, KEYINFO_FILE_PREFIX),
    ] {
        if !has_prefix(path, prefix) {
            warn!(path = %path.display(), "not a generated file, leaving it in place");
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => removed.push(path.to_path_buf()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(removed)
}

fn has_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(prefix))
}
