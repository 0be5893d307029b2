//! Encoding intents into tokens and back

use super::{Field, NavigationIntent, ViewKind};
use crate::error::{MushafError, MushafResult};
use serde::Serialize;
use std::fmt;

/// Separator between the tag and the integer fields
pub const DELIMITER: char = ':';

/// Encoded intent, guaranteed to fit the transport's payload limit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NavigationToken(String);

impl NavigationToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NavigationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NavigationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strict codec bounded by a maximum token size in bytes
#[derive(Debug, Clone, Copy)]
pub struct NavigationCodec {
    max_bytes: usize,
}

impl NavigationCodec {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Encode `intent`, failing instead of truncating when it is too long
    pub fn encode(&self, intent: &NavigationIntent) -> MushafResult<NavigationToken> {
        let fields = intent.view.fields();
        let mut token = intent.view.tag().to_string();

        for field in [Field::Primary, Field::Secondary, Field::Page] {
            let value = intent.get(field);
            match (fields.contains(&field), value) {
                (true, Some(value)) => {
                    token.push(DELIMITER);
                    token.push_str(&value.to_string());
                }
                (true, None) => {
                    return Err(invalid(intent.view, format!("missing {}", field.name())))
                }
                (false, Some(_)) => {
                    return Err(invalid(
                        intent.view,
                        format!("unexpected {}", field.name()),
                    ))
                }
                (false, None) => {}
            }
        }

        if token.len() > self.max_bytes {
            return Err(MushafError::TokenTooLong {
                len: token.len(),
                token,
                limit: self.max_bytes,
            });
        }
        Ok(NavigationToken(token))
    }

    /// Decode a raw token
    ///
    /// Wrong field count, non-decimal fields, leading zeros, unknown tags
    /// and oversized input are all `MalformedToken`.
    pub fn decode(&self, raw: &str) -> MushafResult<NavigationIntent> {
        if raw.len() > self.max_bytes {
            return Err(MushafError::malformed(
                truncate_for_log(raw),
                format!("longer than {} bytes", self.max_bytes),
            ));
        }

        let mut parts = raw.split(DELIMITER);
        let tag = parts.next().unwrap_or_default();
        let view = ViewKind::from_tag(tag)
            .ok_or_else(|| MushafError::malformed(raw, format!("unknown view tag '{tag}'")))?;

        let values: Vec<&str> = parts.collect();
        let fields = view.fields();
        if values.len() != fields.len() {
            return Err(MushafError::malformed(
                raw,
                format!("expected {} fields, found {}", fields.len(), values.len()),
            ));
        }

        let mut intent = NavigationIntent::new(view);
        for (field, text) in fields.iter().zip(values) {
            let value = parse_field(text).ok_or_else(|| {
                MushafError::malformed(raw, format!("bad {} '{text}'", field.name()))
            })?;
            intent.set(*field, value);
        }
        Ok(intent)
    }

    /// Whether `raw` names a known view, without validating its fields
    pub fn recognizes_tag(&self, raw: &str) -> bool {
        let tag = raw.split(DELIMITER).next().unwrap_or_default();
        ViewKind::from_tag(tag).is_some()
    }
}

impl Default for NavigationCodec {
    fn default() -> Self {
        Self::new(64)
    }
}

fn invalid(view: ViewKind, reason: String) -> MushafError {
    MushafError::InvalidIntent {
        view: view.tag().to_string(),
        reason,
    }
}

/// Plain decimal `u32` with no sign and no leading zeros
fn parse_field(text: &str) -> Option<u32> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if canonical {
        text.parse().ok()
    } else {
        None
    }
}

fn truncate_for_log(raw: &str) -> String {
    raw.chars().take(32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> NavigationCodec {
        NavigationCodec::new(64)
    }

    fn all_shapes(a: u32, b: u32, c: u32) -> Vec<NavigationIntent> {
        vec![
            NavigationIntent::main_menu(),
            NavigationIntent::surah_index(c),
            NavigationIntent::surah(a),
            NavigationIntent::read_surah(a),
            NavigationIntent::continue_reading(a, b),
            NavigationIntent::surah_images(a),
            NavigationIntent::page_image(b, a),
            NavigationIntent::audio_index(c),
            NavigationIntent::reciters(a, c),
            NavigationIntent::play_audio(b, a),
            NavigationIntent::juz_index(c),
            NavigationIntent::juz(a),
            NavigationIntent::search(),
            NavigationIntent::check_subscription(),
        ]
    }

    #[test]
    fn every_view_round_trips_at_field_extremes() {
        let codec = codec();
        for (a, b, c) in [(0, 0, 0), (1, 604, 11), (u32::MAX, u32::MAX, u32::MAX)] {
            for intent in all_shapes(a, b, c) {
                let token = codec.encode(&intent).unwrap();
                assert!(token.as_str().len() <= 64, "{token}");
                assert_eq!(codec.decode(token.as_str()).unwrap(), intent);
            }
        }
    }

    #[test]
    fn shapes_cover_every_view() {
        let views: Vec<ViewKind> = all_shapes(1, 1, 1).iter().map(|i| i.view).collect();
        assert_eq!(views, ViewKind::ALL);
    }

    #[test]
    fn token_layout() {
        let token = codec().encode(&NavigationIntent::reciters(2, 3)).unwrap();
        assert_eq!(token.as_str(), "recs:2:3");
        let token = codec().encode(&NavigationIntent::main_menu()).unwrap();
        assert_eq!(token.as_str(), "menu");
    }

    #[test]
    fn garbage_is_malformed() {
        let err = codec().decode("garbage_token").unwrap_err();
        assert!(matches!(err, MushafError::MalformedToken { .. }));
    }

    #[test]
    fn strict_field_parsing() {
        let codec = codec();
        for raw in [
            "sura", "sura:", "sura:1:2", "sura:-1", "sura:+1", "sura:01", "sura:1.0", "sura:x",
            "sura:4294967296", "menu:1", "idx", "", ":1",
        ] {
            assert!(
                matches!(codec.decode(raw), Err(MushafError::MalformedToken { .. })),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn encode_rejects_wrong_shape() {
        let missing = NavigationIntent::new(ViewKind::PlayAudio).with_primary(1);
        assert!(matches!(
            codec().encode(&missing),
            Err(MushafError::InvalidIntent { .. })
        ));

        let extra = NavigationIntent::main_menu().with_page(2);
        assert!(matches!(
            codec().encode(&extra),
            Err(MushafError::InvalidIntent { .. })
        ));
    }

    #[test]
    fn encode_fails_instead_of_truncating() {
        let tight = NavigationCodec::new(8);
        let err = tight
            .encode(&NavigationIntent::play_audio(123456, 114))
            .unwrap_err();
        match err {
            MushafError::TokenTooLong { len, limit, .. } => {
                assert_eq!(limit, 8);
                assert_eq!(len, "play:123456:114".len());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oversized_input_is_malformed() {
        let raw = format!("sura:{}", "1".repeat(80));
        assert!(matches!(
            codec().decode(&raw),
            Err(MushafError::MalformedToken { .. })
        ));
    }

    #[test]
    fn tag_recognition() {
        assert!(codec().recognizes_tag("sura:9"));
        assert!(codec().recognizes_tag("sura:bad"));
        assert!(!codec().recognizes_tag("garbage_token"));
    }
}
