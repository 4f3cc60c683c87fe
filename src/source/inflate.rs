use super::ByteSource;
use flate2::{Decompress, FlushDecompress, Status};
use tracing::{trace, warn};

/// Size of the compressed-input staging buffer (64KB)
pub const STAGING_BUFFER_SIZE: usize = 65536;

/// zlib inflate decorator
///
/// Staged input is refilled from upstream only once the decompressor has
/// consumed all of it. Output is written straight into the caller's buffer,
/// and a read returns short only at the end of the stream.
pub struct InflateSource<'k> {
    upstream: ByteSource<'k>,
    staging: Box<[u8; STAGING_BUFFER_SIZE]>,
    start: usize,
    end: usize,
    decompress: Decompress,
    upstream_done: bool,
    finished: bool,
}

impl<'k> InflateSource<'k> {
    pub fn new(upstream: ByteSource<'k>) -> Self {
        Self {
            upstream,
            staging: Box::new([0u8; STAGING_BUFFER_SIZE]),
            start: 0,
            end: 0,
            decompress: Decompress::new(true),
            upstream_done: false,
            finished: false,
        }
    }

    /// Whether the compressed stream reached its logical end or failed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn total_out(&self) -> u64 {
        self.decompress.total_out()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        while written < buf.len() && !self.finished {
            if self.start == self.end && !self.upstream_done {
                let n = self.upstream.read(&mut self.staging[..]);
                if n == 0 {
                    self.upstream_done = true;
                } else {
                    self.start = 0;
                    self.end = n;
                }
            }

            let input = &self.staging[self.start..self.end];
            let before_in = self.decompress.total_in();
            let before_out = self.decompress.total_out();
            let result = self
                .decompress
                .decompress(input, &mut buf[written..], FlushDecompress::None);
            let consumed = (self.decompress.total_in() - before_in) as usize;
            let produced = (self.decompress.total_out() - before_out) as usize;
            self.start += consumed;
            written += produced;

            match result {
                Ok(Status::StreamEnd) => {
                    trace!("Inflate stream ended after {} bytes", self.total_out());
                    self.finished = true;
                }
                Ok(Status::Ok) | Ok(Status::BufError) => {
                    if consumed == 0 && produced == 0 {
                        if self.upstream_done {
                            // Upstream ran dry before the stream end marker
                            break;
                        }
                        if self.start < self.end {
                            warn!("Inflate stalled with {} staged bytes", self.end - self.start);
                            self.finished = true;
                        }
                    }
                }
                Err(e) => {
                    warn!("Inflate failed: {}", e);
                    self.finished = true;
                }
            }
        }
        written
    }
}

impl std::fmt::Debug for InflateSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflateSource")
            .field("upstream", &self.upstream)
            .field("staged", &(self.end - self.start))
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
