//! Initialization vector helpers.

use crate::{error::KeyInfoError, random::RandomSource};

/// IVs are 128 bits, emitted as 32 lowercase hex characters.
pub const IV_LEN: usize = 16;

/// Fallback used by best-effort generation when the random source fails.
pub const ZERO_IV: &str = "00000000000000000000000000000000";

/// Draw a fresh IV from `random` and hex-encode it.
pub fn generate<R: RandomSource + ?Sized>(random: &R) -> Result<String, KeyInfoError> {
    let mut bytes = [0u8; IV_LEN];
    random.fill(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Check that `iv` is exactly 32 hex digits. Uppercase is accepted since
/// ffmpeg parses either case.
pub fn validate(iv: &str) -> Result<(), KeyInfoError> {
    if iv.len() != IV_LEN * 2 {
        return Err(KeyInfoError::InvalidIv {
            reason: format!("expected {} hex characters, got {}", IV_LEN * 2, iv.len()),
        });
    }
    if let Some(bad) = iv.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(KeyInfoError::InvalidIv {
            reason: format!("non-hex character {bad:?}"),
        });
    }
    Ok(())
}
