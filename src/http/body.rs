//! Response body that is either resident in memory or streamed from a file
//!
//! The file variant owns its handle, so dropping the body (for example when
//! the client disconnects mid-transfer) closes the file.

use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// Body of every response produced by this crate
#[derive(Debug)]
pub enum ResponseBody {
    /// Fully materialized content, taken on first poll
    Full(Option<Bytes>),
    /// Content read from disk in fixed-size blocks
    File(FileStream),
}

impl ResponseBody {
    pub const fn empty() -> Self {
        Self::Full(None)
    }

    pub fn full(data: impl Into<Bytes>) -> Self {
        Self::Full(Some(data.into()))
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Full(data) => Poll::Ready(
                data.take()
                    .filter(|b| !b.is_empty())
                    .map(|b| Ok(Frame::data(b))),
            ),
            Self::File(stream) => stream.poll_block(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Full(data) => data.as_ref().map_or(true, Bytes::is_empty),
            Self::File(stream) => stream.remaining == 0,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Full(data) => SizeHint::with_exact(data.as_ref().map_or(0, |b| b.len() as u64)),
            Self::File(stream) => SizeHint::with_exact(stream.remaining),
        }
    }
}

/// Streams `remaining` bytes of an open file starting at an offset
#[derive(Debug)]
pub struct FileStream {
    file: File,
    /// Offset still to seek to before the first read
    seek_to: Option<u64>,
    seeking: bool,
    remaining: u64,
    buf: Vec<u8>,
}

impl FileStream {
    pub fn new(file: File, offset: u64, length: u64, block_size: usize) -> Self {
        Self {
            file,
            seek_to: (offset > 0).then_some(offset),
            seeking: false,
            remaining: length,
            buf: vec![0; block_size.max(1)],
        }
    }

    fn poll_block(&mut self, cx: &mut Context<'_>) -> Poll<Option<io::Result<Frame<Bytes>>>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }

        if let Some(offset) = self.seek_to {
            if !self.seeking {
                if let Err(e) = Pin::new(&mut self.file).start_seek(SeekFrom::Start(offset)) {
                    return Poll::Ready(Some(Err(e)));
                }
                self.seeking = true;
            }
            if let Err(e) = ready!(Pin::new(&mut self.file).poll_complete(cx)) {
                return Poll::Ready(Some(Err(e)));
            }
            self.seek_to = None;
            self.seeking = false;
        }

        let want = usize::try_from(self.remaining).map_or(self.buf.len(), |r| r.min(self.buf.len()));
        let mut read_buf = ReadBuf::new(&mut self.buf[..want]);
        if let Err(e) = ready!(Pin::new(&mut self.file).poll_read(cx, &mut read_buf)) {
            return Poll::Ready(Some(Err(e)));
        }

        let filled = read_buf.filled();
        if filled.is_empty() {
            return Poll::Ready(Some(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank while streaming",
            ))));
        }

        let chunk = Bytes::copy_from_slice(filled);
        self.remaining -= chunk.len() as u64;
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::io::Write;

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_body() {
        let body = ResponseBody::full("hello");
        assert_eq!(body.size_hint().exact(), Some(5));
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(&collected[..], b"hello");
    }

    #[tokio::test]
    async fn test_empty_body() {
        let body = ResponseBody::empty();
        assert!(body.is_end_stream());
        assert!(body.collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_file_stream_in_blocks() {
        let tmp = temp_file(b"abcdefghijklmnopqrstuvwxyz");
        let file = File::open(tmp.path()).await.unwrap();
        let mut body = ResponseBody::File(FileStream::new(file, 3, 15, 4));

        let mut chunks = Vec::new();
        while let Some(frame) = body.frame().await {
            chunks.push(frame.unwrap().into_data().unwrap());
        }
        assert!(chunks.iter().all(|c| c.len() <= 4));
        let joined: Vec<u8> = chunks.concat();
        assert_eq!(&joined[..], b"defghijklmnopqr");
    }

    #[tokio::test]
    async fn test_file_shrunk_is_error() {
        let tmp = temp_file(b"short");
        let file = File::open(tmp.path()).await.unwrap();
        let body = ResponseBody::File(FileStream::new(file, 0, 100, 16));
        assert!(body.collect().await.is_err());
    }
}
