//! Placeholder syntax recognition.
//!
//! Lines are folded with [`normalize_text`] (look-alike delimiters and
//! invisible characters) and then scanned by every enabled
//! [`PatternFamily`], most specific first:
//!
//! ```text
//! {{key}}  { { key } }  [[key]]  ${key}  %{key}%  @{key}  #{key}  {key}  [key]
//! '---------------------- always on ----------------------------'  '- opt-in -'
//! ```
//!
//! Keys captured by single-delimiter families must also pass
//! [`is_false_positive`].

mod matcher;
mod normalize;

pub use matcher::{is_false_positive, PatternFamily, PatternMatch, PatternMatcher};
pub use normalize::{fold_char, normalize_text};
