/*
 * Copyright (C) 2025 The Streamfleet Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::error::Error;
use std::fmt;

/// Boxed error type used at reconciler component boundaries.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug)]
struct AnnotatedError {
    annotation: String,
    source: BoxError,
}

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.annotation, self.source)
    }
}

impl Error for AnnotatedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

/// Wraps an error with an annotation describing the failed operation.
pub fn with_context<E>(error: E, annotation: impl Into<String>) -> BoxError
where
    E: Into<BoxError>,
{
    Box::new(AnnotatedError {
        annotation: annotation.into(),
        source: error.into(),
    })
}

/// Builds a standalone error from a message.
pub fn new_error(message: impl Into<String>) -> BoxError {
    Box::new(MessageError(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended_and_source_preserved() {
        let inner = new_error("remote call failed");
        let wrapped = with_context(inner, "reconcile cluster c1");
        assert_eq!(
            wrapped.to_string(),
            "reconcile cluster c1: remote call failed"
        );
        assert!(wrapped.source().is_some());
    }
}
