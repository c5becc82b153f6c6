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

//! Pooled buffers that make request bodies replayable.
//!
//! A body has to be read twice at least: once to hash it for the signature
//! and once more for every attempt that is sent. Streaming bodies are drained
//! into a buffer leased from a [`BufferPool`] and every attempt gets a cheap
//! [`Bytes`] clone of it.

use bytes::{Bytes, BytesMut};
use log::debug;
use sigv4_core::{Body, Result};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DEFAULT_MAX_IDLE: usize = 64;
const DEFAULT_MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;
const INITIAL_CAPACITY: usize = 8 * 1024;

/// A pool of reusable body buffers.
///
/// Cloning is cheap and every clone shares the same free list.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    free: Mutex<Vec<BytesMut>>,
    allocated: AtomicUsize,
    max_idle: usize,
    max_buffer_size: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("allocated", &self.allocated())
            .field("max_idle", &self.inner.max_idle)
            .field("max_buffer_size", &self.inner.max_buffer_size)
            .finish()
    }
}

impl BufferPool {
    /// Create a pool with default limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_BUFFER_SIZE)
    }

    /// Create a pool that keeps at most `max_idle` buffers around and never
    /// keeps a buffer whose capacity grew beyond `max_buffer_size`.
    pub fn with_limits(max_idle: usize, max_buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(Vec::new()),
                allocated: AtomicUsize::new(0),
                max_idle,
                max_buffer_size,
            }),
        }
    }

    /// Number of buffers waiting in the free list.
    pub fn idle(&self) -> usize {
        self.inner.free.lock().expect("lock poisoned").len()
    }

    /// Number of buffers this pool had to allocate so far.
    pub fn allocated(&self) -> usize {
        self.inner.allocated.load(Ordering::Relaxed)
    }

    /// Capture `body` so it can be replayed.
    ///
    /// - An absent body stays absent and leases nothing.
    /// - An in-memory body is already replayable and is used as is.
    /// - A streaming body is drained into a pooled buffer. The reader is
    ///   consumed here whether draining succeeds or not.
    pub async fn buffer(&self, body: Body) -> Result<BufferedBody> {
        if body.is_empty() {
            return Ok(BufferedBody {
                inner: Buffered::Absent,
            });
        }
        if let Some(bs) = body.as_bytes() {
            return Ok(BufferedBody {
                inner: Buffered::Shared(bs.clone()),
            });
        }

        let mut lease = Lease {
            pool: self,
            buf: Some(self.acquire()),
        };
        let n = body.read_into(lease.buf_mut()).await?;
        debug!("buffered {n} bytes of request body");

        let bytes = lease.take().freeze();
        Ok(BufferedBody {
            inner: Buffered::Pooled {
                bytes: Some(bytes),
                pool: self.clone(),
            },
        })
    }

    fn acquire(&self) -> BytesMut {
        if let Some(buf) = self.inner.free.lock().expect("lock poisoned").pop() {
            return buf;
        }
        self.inner.allocated.fetch_add(1, Ordering::Relaxed);
        BytesMut::with_capacity(INITIAL_CAPACITY)
    }

    fn release(&self, mut buf: BytesMut) {
        if buf.capacity() > self.inner.max_buffer_size {
            debug!("dropping oversized body buffer of {} bytes", buf.capacity());
            return;
        }
        buf.clear();

        let mut free = self.inner.free.lock().expect("lock poisoned");
        if free.len() < self.inner.max_idle {
            free.push(buf);
        }
    }
}

/// Returns the buffer to the pool unless it was taken.
struct Lease<'a> {
    pool: &'a BufferPool,
    buf: Option<BytesMut>,
}

impl Lease<'_> {
    fn buf_mut(&mut self) -> &mut BytesMut {
        self.buf.get_or_insert_with(BytesMut::new)
    }

    fn take(mut self) -> BytesMut {
        self.buf.take().unwrap_or_default()
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

/// A request body captured by [`BufferPool::buffer`].
///
/// Dropping it releases the pooled buffer. The buffer only goes back to the
/// free list when no replay handed out by [`BufferedBody::replay`] is still
/// alive, otherwise it is freed with the last replay.
pub struct BufferedBody {
    inner: Buffered,
}

enum Buffered {
    Absent,
    Shared(Bytes),
    Pooled {
        bytes: Option<Bytes>,
        pool: BufferPool,
    },
}

impl BufferedBody {
    /// Returns true if the original request had no body.
    pub fn is_absent(&self) -> bool {
        matches!(self.inner, Buffered::Absent)
    }

    /// The bytes to sign. Empty for an absent body.
    pub fn payload(&self) -> &[u8] {
        match &self.inner {
            Buffered::Absent => &[],
            Buffered::Shared(bs) => bs.as_ref(),
            Buffered::Pooled { bytes, .. } => bytes.as_deref().unwrap_or_default(),
        }
    }

    /// A fresh body over the captured bytes.
    pub fn replay(&self) -> Body {
        match &self.inner {
            Buffered::Absent => Body::empty(),
            Buffered::Shared(bs) => Body::from(bs.clone()),
            Buffered::Pooled { bytes, .. } => Body::from(bytes.clone().unwrap_or_default()),
        }
    }
}

impl Debug for BufferedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Buffered::Absent => f.write_str("BufferedBody::Absent"),
            Buffered::Shared(bs) => write!(f, "BufferedBody::Shared({} bytes)", bs.len()),
            Buffered::Pooled { bytes, .. } => write!(
                f,
                "BufferedBody::Pooled({} bytes)",
                bytes.as_ref().map_or(0, |bs| bs.len())
            ),
        }
    }
}

impl Drop for BufferedBody {
    fn drop(&mut self) {
        let Buffered::Pooled { bytes, pool } = &mut self.inner else {
            return;
        };
        let Some(bytes) = bytes.take() else {
            return;
        };
        match bytes.try_into_mut() {
            Ok(buf) => pool.release(buf),
            Err(_) => debug!("body buffer still referenced downstream, not returning it"),
        }
    }
}
