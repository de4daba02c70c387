use rocket::http::{ContentType, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::{self, Responder, Response};
use std::convert::Infallible;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Raw `Range` header of the request, if any.
pub struct RangeHeader(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RangeHeader {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(RangeHeader(
            request.headers().get_one("Range").map(str::to_string),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    Full,
    /// Inclusive on both ends.
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Interprets a single `bytes=` range against a file of `size` bytes.
/// Headers this server does not understand, including multi-range
/// requests, fall back to the whole file.
pub fn parse_range(header: Option<&str>, size: u64) -> ByteRange {
    let Some(spec) = header.and_then(|value| value.trim().strip_prefix("bytes=")) else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((start, end)) = spec.trim().split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        // "-N" is the last N bytes.
        return match end.parse::<u64>() {
            Ok(0) => ByteRange::Unsatisfiable,
            Ok(_) if size == 0 => ByteRange::Unsatisfiable,
            Ok(suffix) => ByteRange::Partial {
                start: size.saturating_sub(suffix),
                end: size - 1,
            },
            Err(_) => ByteRange::Full,
        };
    }

    let Ok(start) = start.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if end.is_empty() {
        None
    } else {
        match end.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            _ => return ByteRange::Full,
        }
    };

    if start >= size {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial {
        start,
        end: end.map_or(size - 1, |end| end.min(size - 1)),
    }
}

/// A media file served inline, honouring `Range` requests so players can
/// seek.
pub struct MediaFile {
    file: File,
    size: u64,
    range: ByteRange,
    content_type: ContentType,
}

impl MediaFile {
    pub async fn open(path: &Path, range: Option<&str>) -> std::io::Result<Self> {
        let mut file = File::open(path).await?;
        let size = file.metadata().await?.len();
        let range = parse_range(range, size);
        if let ByteRange::Partial { start, .. } = range {
            file.seek(SeekFrom::Start(start)).await?;
        }

        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ContentType::from_extension)
            .unwrap_or(ContentType::Binary);

        Ok(MediaFile {
            file,
            size,
            range,
            content_type,
        })
    }
}

impl<'r> Responder<'r, 'static> for MediaFile {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build();
        response
            .header(self.content_type)
            .raw_header("Accept-Ranges", "bytes");

        match self.range {
            ByteRange::Full => {
                response.sized_body(usize::try_from(self.size).ok(), self.file);
            }
            ByteRange::Partial { start, end } => {
                let length = end - start + 1;
                response
                    .status(Status::PartialContent)
                    .raw_header("Content-Range", format!("bytes {start}-{end}/{}", self.size))
                    .raw_header("Content-Length", length.to_string())
                    .streamed_body(self.file.take(length));
            }
            ByteRange::Unsatisfiable => {
                response
                    .status(Status::RangeNotSatisfiable)
                    .raw_header("Content-Range", format!("bytes */{}", self.size));
            }
        }

        response.ok()
    }
}
