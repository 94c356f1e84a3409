//! Portable representation of errors reported by the host platform.

use std::borrow::Cow;

use derive_more::Display;

/// Error returned from a host platform facility.
///
/// Carries the platform's error name (e.g. `NotAllowedError`) and its
/// human-readable message as plain strings, so it can cross the platform
/// seam without dragging host handles along.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display(fmt = "{}: {}", name, message)]
pub struct Error {
    /// Name of this error.
    name: Cow<'static, str>,

    /// Message of this error.
    message: Cow<'static, str>,
}

impl Error {
    /// Builds a new [`Error`] out of the provided name and message.
    #[must_use]
    pub fn new<N, M>(name: N, message: M) -> Self
    where
        N: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns name of this [`Error`].
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns message of this [`Error`].
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
