use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::intake::domain::fingerprint::Fingerprint;
use crate::intake::infrastructure::IntakeError;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Streams the file through SHA-256 without loading it whole.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, IntakeError> {
    let read_err = |source| IntakeError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint::new(hasher.finalize().into()))
}
