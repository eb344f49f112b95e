//! Errors annotated with a message, context and call site.

use std::error::Error;
use std::fmt;

use serde_json::Value;

use crate::error::fields::{to_fields, Fielder, Fields};
use crate::error::frame::{capture_frame, Frame};

/// Boxed error accepted as the inner error of a wrap.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error annotating another error.
///
/// Immutable once built. `Display` yields the message only; the inner error
/// is reachable through [`Error::source`] and is flattened under
/// `innerError` by [`Fielder::to_fields`].
#[derive(Debug)]
pub struct WrappedError {
    message: String,
    context: Option<Fields>,
    frame: Option<Frame>,
    inner: Option<BoxError>,
}

impl WrappedError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&Fields> {
        self.context.as_ref()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn inner(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.inner.as_deref()
    }
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for WrappedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

impl Fielder for WrappedError {
    /// Keys present only when the information is: `innerError` with an
    /// inner error, `file`/`line` with a frame, `function` with a resolved
    /// symbol. Context entries are applied last and win on collision.
    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("message".to_string(), Value::String(self.message.clone()));

        if let Some(inner) = self.source() {
            fields.insert("innerError".to_string(), Value::Object(to_fields(inner)));
        }

        if let Some(frame) = &self.frame {
            if let Some(function) = frame.function.as_deref().filter(|f| !f.is_empty()) {
                fields.insert("function".to_string(), Value::String(function.to_string()));
            }
            fields.insert("file".to_string(), Value::String(frame.file.clone()));
            fields.insert("line".to_string(), Value::from(frame.line));
        }

        if let Some(context) = &self.context {
            for (key, value) in context {
                fields.insert(key.clone(), value.clone());
            }
        }

        fields
    }
}

/// Annotate `inner` with `message`, recording the caller's location.
///
/// Captures a backtrace to name the enclosing function; see
/// [`capture_frame`] for the cost.
#[track_caller]
pub fn wrap(inner: Option<BoxError>, message: impl Into<String>) -> WrappedError {
    WrappedError {
        message: message.into(),
        context: None,
        frame: capture_frame(0),
        inner,
    }
}

/// Annotate `inner` with `message` and structured `context`.
#[track_caller]
pub fn wrap_with_context(
    inner: Option<BoxError>,
    message: impl Into<String>,
    context: Fields,
) -> WrappedError {
    WrappedError {
        message: message.into(),
        context: Some(context),
        frame: capture_frame(0),
        inner,
    }
}

/// Like [`wrap_with_context`], attributing the frame `stack_skip` levels
/// above the caller.
///
/// caller -> 0, caller of the caller -> 1, and so on. Meant for helpers
/// that wrap on behalf of someone else.
#[track_caller]
pub fn wrap_with_context_and_stack(
    inner: Option<BoxError>,
    message: impl Into<String>,
    context: Fields,
    stack_skip: usize,
) -> WrappedError {
    WrappedError {
        message: message.into(),
        context: Some(context),
        frame: capture_frame(stack_skip),
        inner,
    }
}
