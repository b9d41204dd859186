//! Field normalizers shared by the extractors.
//!
//! - [`TimeNormalizer`] - heterogeneous timestamp strings → [`Timestamp`]
//! - [`SlugNormalizer`] - chat titles → URL-safe slugs
//!
//! Both are pure: the same input always yields the same output, and neither
//! reads the system clock or the process locale.

pub mod slug;
pub mod time;

pub use slug::{SlugNormalizer, normalize_slug};
pub use time::{Confidence, DateOrder, NormalizedTime, TimeNormalizer, Timestamp};
