use std::{fs::File, io::Read, path::Path};

use zeroize::Zeroizing;

use crate::error::{ClientError, result::ClientResultHelper};

/// Read all bytes from a file
///
/// The buffer is zeroized on drop: key files hold private material.
pub fn read_bytes_from_file(file: &impl AsRef<Path>) -> Result<Zeroizing<Vec<u8>>, ClientError> {
    let mut buffer = Zeroizing::new(Vec::new());
    File::open(file)
        .with_context(|| format!("could not open the file {}", file.as_ref().display()))?
        .read_to_end(&mut buffer)
        .with_context(|| format!("could not read the file {}", file.as_ref().display()))?;

    Ok(buffer)
}
