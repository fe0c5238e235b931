//! Media object keys and the per-thread namespace check
//!
//! Every object a thread owns lives under `chat-media/<thread_id>/<name>`.
//! [`is_valid_media_path`] is the gate applied to client-supplied keys before
//! they are attached to an image message; it performs no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Top-level namespace reserved for chat media
pub const MEDIA_NAMESPACE: &str = "chat-media";

/// Maximum length of the final path segment
pub const MAX_FILENAME_LEN: usize = 255;

/// An object key known to sit inside one thread's namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaPath(String);

impl MediaPath {
    /// Build `chat-media/<thread_id>/<object_name>`
    ///
    /// Returns `None` if `object_name` is not a safe single segment.
    pub fn new(thread_id: Snowflake, object_name: &str) -> Option<Self> {
        is_safe_object_name(object_name)
            .then(|| Self(format!("{MEDIA_NAMESPACE}/{thread_id}/{object_name}")))
    }

    /// Accept `path` only if it belongs to `thread_id`
    pub fn for_thread(thread_id: Snowflake, path: &str) -> Option<Self> {
        is_valid_media_path(thread_id, path).then(|| Self(path.to_string()))
    }

    /// Parse any well-formed key, whatever thread it belongs to
    pub fn parse(path: &str) -> Option<Self> {
        let (thread_id, _) = split(path)?;
        Self::for_thread(thread_id, path)
    }

    /// Prefix shared by every object of a thread, including the trailing slash
    pub fn thread_prefix(thread_id: Snowflake) -> String {
        format!("{MEDIA_NAMESPACE}/{thread_id}/")
    }

    pub fn thread_id(&self) -> Snowflake {
        // Constructors only admit keys that split cleanly
        split(&self.0).map(|(id, _)| id).unwrap_or_default()
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// True only for `chat-media/<thread_id>/<name>` with a safe `name`
///
/// Rejects other threads' namespaces, absolute paths, `.`/`..` segments,
/// backslashes, empty segments and anything with extra nesting.
pub fn is_valid_media_path(thread_id: Snowflake, path: &str) -> bool {
    match split(path) {
        Some((owner, _)) => owner == thread_id && owner.to_string() == thread_segment(path),
        None => false,
    }
}

fn thread_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or_default()
}

fn split(path: &str) -> Option<(Snowflake, &str)> {
    let mut segments = path.split('/');
    let namespace = segments.next()?;
    let thread = segments.next()?;
    let name = segments.next()?;
    if segments.next().is_some() || namespace != MEDIA_NAMESPACE {
        return None;
    }
    if thread.is_empty() || !thread.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let thread_id = thread.parse::<i64>().ok().map(Snowflake::new)?;
    is_safe_object_name(name).then_some((thread_id, name))
}

fn is_safe_object_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FILENAME_LEN
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: Snowflake = Snowflake::new(7);
    const T2: Snowflake = Snowflake::new(8);

    #[test]
    fn test_accepts_own_namespace() {
        assert!(is_valid_media_path(T1, "chat-media/7/photo.jpg"));
        assert!(is_valid_media_path(T1, "chat-media/7/3f2a-b_c.d.png"));
    }

    #[test]
    fn test_rejects_other_thread() {
        assert!(!is_valid_media_path(T1, "chat-media/8/photo.jpg"));
        assert!(is_valid_media_path(T2, "chat-media/8/photo.jpg"));
    }

    #[test]
    fn test_rejects_traversal_and_absolute() {
        assert!(!is_valid_media_path(T1, "/chat-media/7/photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/7/../8/photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/7/.."));
        assert!(!is_valid_media_path(T1, "chat-media/7/.hidden"));
        assert!(!is_valid_media_path(T1, "chat-media/7/a\\b.jpg"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_media_path(T1, ""));
        assert!(!is_valid_media_path(T1, "chat-media/7"));
        assert!(!is_valid_media_path(T1, "chat-media/7/"));
        assert!(!is_valid_media_path(T1, "chat-media//photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/7/sub/photo.jpg"));
        assert!(!is_valid_media_path(T1, "other/7/photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/007/photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/+7/photo.jpg"));
        assert!(!is_valid_media_path(T1, "chat-media/7/photo .jpg"));
    }

    #[test]
    fn test_rejects_overlong_name() {
        let name = "a".repeat(MAX_FILENAME_LEN + 1);
        assert!(!is_valid_media_path(T1, &format!("chat-media/7/{name}")));
    }

    #[test]
    fn test_media_path_accessors() {
        let path = MediaPath::new(T1, "abc-photo.jpg").unwrap();
        assert_eq!(path.as_str(), "chat-media/7/abc-photo.jpg");
        assert_eq!(path.thread_id(), T1);
        assert_eq!(path.file_name(), "abc-photo.jpg");
        assert!(path.as_str().starts_with(&MediaPath::thread_prefix(T1)));
        assert!(MediaPath::new(T1, "../x").is_none());
    }

    #[test]
    fn test_parse_any_thread() {
        let path = MediaPath::parse("chat-media/8/x.png").unwrap();
        assert_eq!(path.thread_id(), T2);
        assert!(MediaPath::parse("chat-media/x/x.png").is_none());
    }
}
