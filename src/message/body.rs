//! Single-consumer handle on an unread request body.

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::body::Body;

/// The raw request stream of a file-upload request.
///
/// Cloning a `Message` clones this handle, not the stream: whichever stage
/// calls [`RequestBody::take`] first owns the bytes.
#[derive(Clone)]
pub struct RequestBody {
    inner: Arc<Mutex<Option<Body>>>,
}

impl RequestBody {
    pub fn new(body: Body) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(body))),
        }
    }

    /// Take ownership of the stream. Returns `None` once consumed.
    pub fn take(&self) -> Option<Body> {
        match self.inner.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// True once some stage has taken the stream.
    pub fn is_consumed(&self) -> bool {
        match self.inner.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
