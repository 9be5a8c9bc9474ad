use crossbeam_channel::{bounded, select, Receiver};
use std::io::{self, Read};
use std::thread;

/// Chunks in flight between the reader thread and the consumer
const CHANNEL_DEPTH: usize = 4;

/// Iterator over fixed-size chunks of a reader
///
/// Every chunk except the last is exactly `chunk_size` bytes. An I/O error is
/// yielded once and ends the iteration.
pub struct ChunkReader<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

/// Fill up to `chunk_size` bytes, stopping early only at end of input
fn read_chunk<R: Read>(reader: &mut R, chunk_size: usize) -> io::Result<Vec<u8>> {
    let mut chunk = vec![0u8; chunk_size];
    let mut filled = 0;
    while filled < chunk_size {
        match reader.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    chunk.truncate(filled);
    Ok(chunk)
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_chunk(&mut self.reader, self.chunk_size) {
            Ok(chunk) if chunk.is_empty() => {
                self.done = true;
                None
            }
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Chunk source fed by a background reader thread
///
/// Blocking reads (stdin, pipes) happen off the consuming thread, so a
/// message on the shutdown channel ends the stream promptly with an
/// `Interrupted` error even while the reader is stalled.
pub struct ChannelChunkSource<C = ()> {
    data: Receiver<io::Result<Vec<u8>>>,
    shutdown: Option<Receiver<C>>,
    done: bool,
}

impl ChannelChunkSource<()> {
    pub fn spawn<R: Read + Send + 'static>(reader: R, chunk_size: usize) -> io::Result<Self> {
        let (sender, data) = bounded(CHANNEL_DEPTH);

        thread::Builder::new()
            .name("topids-reader".to_string())
            .spawn(move || {
                for chunk in ChunkReader::new(reader, chunk_size) {
                    if sender.send(chunk).is_err() {
                        break; // Receiver dropped
                    }
                }
            })?;

        Ok(Self {
            data,
            shutdown: None,
            done: false,
        })
    }
}

impl<C> ChannelChunkSource<C> {
    /// Stop the stream on the first message (or disconnect) of `shutdown`
    pub fn with_shutdown<D>(self, shutdown: Receiver<D>) -> ChannelChunkSource<D> {
        ChannelChunkSource {
            data: self.data,
            shutdown: Some(shutdown),
            done: self.done,
        }
    }
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "input read aborted by shutdown request")
}

impl<C> Iterator for ChannelChunkSource<C> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let received = match &self.shutdown {
            Some(shutdown) => select! {
                recv(self.data) -> msg => msg.ok(),
                recv(shutdown) -> _ => Some(Err(interrupted())),
            },
            None => self.data.recv().ok(),
        };

        match received {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                // Reader thread finished and hung up
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Reader that never returns
    struct Stalled;

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            loop {
                thread::park();
            }
        }
    }

    #[test]
    fn test_chunk_reader_fixed_sizes() {
        let chunks: Vec<Vec<u8>> = ChunkReader::new(Cursor::new(b"abcdefghij".to_vec()), 4)
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(chunks, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]);
    }

    #[test]
    fn test_chunk_reader_fills_short_reads() {
        let reader = Trickle {
            data: b"0123456789".to_vec(),
            pos: 0,
            step: 3,
        };
        let sizes: Vec<usize> = ChunkReader::new(reader, 5)
            .map(|c| c.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![5, 5]);
    }

    #[test]
    fn test_chunk_reader_empty_input() {
        assert_eq!(ChunkReader::new(io::empty(), 16).count(), 0);
    }

    #[test]
    fn test_channel_source_delivers_everything() {
        let source = ChannelChunkSource::spawn(Cursor::new(b"a_1\nb_2\nc_3\n".to_vec()), 5).unwrap();
        let bytes: Vec<u8> = source.flat_map(|c| c.unwrap()).collect();
        assert_eq!(bytes, b"a_1\nb_2\nc_3\n".to_vec());
    }

    #[test]
    fn test_channel_source_shutdown_interrupts_stalled_read() {
        let (tx, rx) = bounded::<()>(1);
        let mut source = ChannelChunkSource::spawn(Stalled, 8)
            .unwrap()
            .with_shutdown(rx);
        tx.send(()).unwrap();

        let err = source.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert!(source.next().is_none());
    }
}
