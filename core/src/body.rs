// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Request and response bodies passed between transports.

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use std::fmt::{self, Debug};
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Body of a request or response travelling through a [`crate::RoundTrip`].
///
/// A body is either absent, an in-memory buffer, or a reader that can be
/// consumed exactly once. Absent and zero-length are different things: a
/// transport must not send a body at all for [`Body::empty`].
pub struct Body {
    inner: Inner,
}

enum Inner {
    Empty,
    Bytes(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send + Sync + 'static>>),
}

impl Body {
    /// An absent body.
    pub fn empty() -> Self {
        Self {
            inner: Inner::Empty,
        }
    }

    /// A body that streams from `reader`. It can only be read once.
    pub fn from_reader(reader: impl AsyncRead + Send + Sync + 'static) -> Self {
        Self {
            inner: Inner::Reader(Box::pin(reader)),
        }
    }

    /// Returns true if there is no body at all.
    pub fn is_empty(&self) -> bool {
        matches!(self.inner, Inner::Empty)
    }

    /// Returns true if the body is a one-shot reader.
    pub fn is_streaming(&self) -> bool {
        matches!(self.inner, Inner::Reader(_))
    }

    /// Borrow the in-memory content, if this body is held in memory.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.inner {
            Inner::Bytes(bs) => Some(bs),
            _ => None,
        }
    }

    /// The exact length when it's known without reading.
    pub fn size_hint(&self) -> Option<usize> {
        match &self.inner {
            Inner::Empty => Some(0),
            Inner::Bytes(bs) => Some(bs.len()),
            Inner::Reader(_) => None,
        }
    }

    /// Drain the whole body into `buf`, returning the number of bytes read.
    ///
    /// The body is consumed: a reader is dropped once it reports EOF or fails.
    pub async fn read_into(self, buf: &mut BytesMut) -> Result<usize> {
        match self.inner {
            Inner::Empty => Ok(0),
            Inner::Bytes(bs) => {
                buf.extend_from_slice(&bs);
                Ok(bs.len())
            }
            Inner::Reader(mut r) => {
                let mut total = 0;
                loop {
                    let n = r
                        .read_buf(buf)
                        .await
                        .map_err(|e| Error::unexpected("failed to read body").with_source(e))?;
                    if n == 0 {
                        break;
                    }
                    total += n;
                }
                Ok(total)
            }
        }
    }

    /// Collect the whole body into memory.
    pub async fn collect(self) -> Result<Bytes> {
        match self.inner {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Bytes(bs) => Ok(bs),
            inner @ Inner::Reader(_) => {
                let mut buf = BytesMut::new();
                Body { inner }.read_into(&mut buf).await?;
                Ok(buf.freeze())
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Empty => f.write_str("Body::Empty"),
            Inner::Bytes(bs) => write!(f, "Body::Bytes({} bytes)", bs.len()),
            Inner::Reader(_) => f.write_str("Body::Reader"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Self {
            inner: Inner::Bytes(bs),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Bytes::from(v).into()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Bytes::from(s).into()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(s: &'static [u8]) -> Self {
        Bytes::from_static(s).into()
    }
}
