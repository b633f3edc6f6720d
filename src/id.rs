//! Identifiers and identifier allocation.
//!
//! Ids are plain strings on the wire so data written by other front ends
//! (and the built-in seed data) stays readable. New ids are allocated as
//! `<prefix>-<millis>-<suffix>`: a timestamp that never repeats within one
//! allocator, followed by nine random base-36 characters so that allocators
//! in different tabs do not collide without coordinating.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing id string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Stable identifier of a [`Story`](crate::Story).
    StoryId
}

string_id! {
    /// Stable identifier of a [`Category`](crate::Category).
    CategoryId
}

string_id! {
    /// Identifier of a [`MediaAssetRecord`](crate::MediaAssetRecord).
    MediaId
}

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(char::from(BASE36[(bits % 36) as usize]));
        bits /= 36;
    }
    out
}

/// Allocates practically unique ids without a central sequence.
///
/// The timestamp component is the current time in milliseconds, bumped by one
/// whenever the clock has not advanced past the last allocation, so ids from
/// one allocator are strictly increasing in that component. Ids are never
/// reused after a delete.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last_millis: AtomicI64,
}

impl IdAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new id string with the given prefix.
    #[must_use]
    pub fn allocate(&self, prefix: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Relaxed);
        let millis = loop {
            let next = now.max(last + 1);
            match self
                .last_millis
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break next,
                Err(current) => last = current,
            }
        };
        format!("{prefix}-{millis}-{}", random_suffix())
    }

    /// Allocate a typed id.
    #[must_use]
    pub fn next<I: From<String>>(&self, prefix: &str) -> I {
        I::from(self.allocate(prefix))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_id_shape() {
        let alloc = IdAllocator::new();
        let id = alloc.allocate("media");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "media");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_rapid_allocation_is_unique() {
        let alloc = IdAllocator::new();
        let ids: HashSet<String> = (0..5_000).map(|_| alloc.allocate("story")).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_timestamp_component_strictly_increases() {
        let alloc = IdAllocator::new();
        let millis: Vec<i64> = (0..100)
            .map(|_| {
                let id = alloc.allocate("c");
                id.split('-').nth(1).unwrap().parse().unwrap()
            })
            .collect();
        assert!(millis.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_separate_allocators_do_not_collide() {
        let a = IdAllocator::new();
        let b = IdAllocator::new();
        let ids: HashSet<String> = (0..1_000)
            .flat_map(|_| [a.allocate("story"), b.allocate("story")])
            .collect();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn test_typed_ids() {
        let alloc = IdAllocator::new();
        let id: StoryId = alloc.next("story");
        assert!(id.as_str().starts_with("story-"));
        assert_eq!(StoryId::from("story-1").to_string(), "story-1");
        assert_eq!(serde_json::to_string(&CategoryId::new("bedtime")).unwrap(), "\"bedtime\"");
    }
}
