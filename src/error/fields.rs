//! Structured fields and error flattening.

use std::error::Error;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::WrappedError;

/// Semi-structured data attached to log lines and errors.
pub type Fields = Map<String, Value>;

/// Types that can render themselves as log fields.
pub trait Fielder {
    fn to_fields(&self) -> Fields;
}

/// An error that also carries structured fields.
pub trait FieldedError: Error + Fielder + Send + Sync + 'static {}

impl<T> FieldedError for T where T: Error + Fielder + Send + Sync + 'static {}

/// Type-erased holder that lets the flattener find a user-defined [`Fielder`]
/// inside a `dyn Error` chain.
///
/// `WrappedError` is recognized directly; any other fielded error should be
/// boxed through this adapter before being wrapped or logged.
pub struct Fielded(Box<dyn FieldedError>);

impl Fielded {
    pub fn new<E: FieldedError>(err: E) -> Self {
        Self(Box::new(err))
    }

    /// The wrapped error.
    pub fn get_ref(&self) -> &dyn FieldedError {
        self.0.as_ref()
    }
}

impl fmt::Debug for Fielded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Fielded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for Fielded {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Fielder for Fielded {
    fn to_fields(&self) -> Fields {
        self.get_ref().to_fields()
    }
}

/// Flatten an optional error; `None` in, `None` out.
pub fn error_fields(err: Option<&(dyn Error + 'static)>) -> Option<Fields> {
    err.map(to_fields)
}

/// Flatten an error into fields.
///
/// Errors exposing [`Fielder`] render themselves. Anything else degrades to
/// `{"error": <display>, "data": <debug>}`.
pub fn to_fields(err: &(dyn Error + 'static)) -> Fields {
    if let Some(wrapped) = err.downcast_ref::<WrappedError>() {
        return wrapped.to_fields();
    }

    if let Some(fielded) = err.downcast_ref::<Fielded>() {
        return fielded.to_fields();
    }

    let mut fields = Fields::new();
    fields.insert("error".to_string(), Value::String(err.to_string()));
    fields.insert("data".to_string(), Value::String(format!("{err:?}")));
    fields
}

/// Serialize any value into a field value, `null` when it cannot be represented.
#[doc(hidden)]
pub fn value_of<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Build [`Fields`] from `key => value` pairs.
///
/// ```
/// let fields = fieldlog::fields! { "count" => 1, "context" => "Foo Info" };
/// assert_eq!(fields["count"], 1);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(::std::string::ToString::to_string(&$key), $crate::error::fields::value_of(&$value));
        )+
        fields
    }};
}
