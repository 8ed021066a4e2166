use std::sync::{Arc, Mutex};

use rand::{rngs::OsRng, RngCore};

use crate::error::KeyInfoError;

/// Source of key and IV bytes (OS generator in production; doubles in tests).
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely or fail; partial fills are never reported as success.
    fn fill(&self, dest: &mut [u8]) -> Result<(), KeyInfoError>;
}

/// Operating system CSPRNG via `rand`'s `OsRng`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), KeyInfoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| KeyInfoError::RandomSource {
                reason: e.to_string(),
            })
    }
}

/// Always fails. Used to exercise the random-source error paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRandom;

impl RandomSource for FailingRandom {
    fn fill(&self, _dest: &mut [u8]) -> Result<(), KeyInfoError> {
        Err(KeyInfoError::RandomSource {
            reason: "random source disabled".to_string(),
        })
    }
}

/// Replays scripted outcomes in order: `Some(byte)` fills with that byte,
/// `None` fails. Falls back to `OsRandom` once the script runs out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    script: Arc<Mutex<Vec<Option<u8>>>>,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = Option<u8>>) -> Self {
        let mut script: Vec<_> = script.into_iter().collect();
        script.reverse();
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), KeyInfoError> {
        let next = self
            .script
            .lock()
            .map_err(|err| KeyInfoError::RandomSource {
                reason: format!("lock poisoned: {err}"),
            })?
            .pop();

        match next {
            Some(Some(byte)) => {
                dest.fill(byte);
                Ok(())
            }
            Some(None) => FailingRandom.fill(dest),
            None => OsRandom.fill(dest),
        }
    }
}
