use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, Chain, Cursor, Read};
use std::path::Path;

/// Compression detected from the first bytes of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    Plain,
}

/// Gzip (1F 8B 08) or zstd (28 B5 2F FD) by magic bytes
fn detect(head: &[u8]) -> Compression {
    if head.len() >= 3 && head[0] == 0x1F && head[1] == 0x8B && head[2] == 0x08 {
        Compression::Gzip
    } else if head.len() >= 4 && head[0] == 0x28 && head[1] == 0xB5 && head[2] == 0x2F && head[3] == 0xFD
    {
        Compression::Zstd
    } else {
        Compression::Plain
    }
}

/// Fill `buf` as far as the reader allows; short only at end of input
fn read_head<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match reader.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

/// Wrap `reader` in a gzip or zstd decoder when its magic bytes say so
///
/// The sniffed bytes are put back in front with a cursor chain, so plain
/// input passes through unchanged.
pub fn maybe_decompress<R: Read + Send + 'static>(
    mut reader: R,
) -> io::Result<(Compression, Box<dyn Read + Send>)> {
    let mut head = [0u8; 4];
    let n = read_head(&mut reader, &mut head)?;

    let prefix = Cursor::new(head[..n].to_vec());
    let chained: Chain<Cursor<Vec<u8>>, R> = prefix.chain(reader);

    let compression = detect(&head[..n]);
    let decoded: Box<dyn Read + Send> = match compression {
        Compression::Gzip => Box::new(MultiGzDecoder::new(chained)),
        Compression::Zstd => Box::new(zstd::Decoder::new(chained)?),
        Compression::Plain => Box::new(chained),
    };
    Ok((compression, decoded))
}

/// Open an input file with compression auto-detection
pub fn open_input<P: AsRef<Path>>(path: P) -> io::Result<(Compression, Box<dyn Read + Send>)> {
    let path_ref = path.as_ref();

    if let Some(extension) = path_ref.extension().and_then(|ext| ext.to_str()) {
        if extension.eq_ignore_ascii_case("zip") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "ZIP archives are not supported, only gzip and zstd streams are. Extract it first: unzip {}",
                    path_ref.display()
                ),
            ));
        }
    }

    maybe_decompress(File::open(path_ref)?)
}
