//! Catalog data shapes, both on the wire and normalised

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Verse 1 prefixes stripped before display (the basmala is shown once as a header)
const BASMALA_VARIANTS: [&str; 3] = [
    "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ",
    "بِسمِ اللَّهِ الرَّحمٰنِ الرَّحيمِ",
    "بِسْمِ اللهِ الرَّحْمٰنِ الرَّحِيْمِ",
];

/// The only surah that does not open with the basmala
pub const SURAH_WITHOUT_BASMALA: u32 = 9;

/// Number of surahs in the corpus
pub const SURAH_COUNT: u32 = 114;

/// Number of juz divisions
pub const JUZ_COUNT: u32 = 30;

/// `{ "code": 200, "data": ... }` wrapper used by the text API
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload, if the envelope reports success and carries data
    pub fn into_valid(self) -> Option<T> {
        if self.code == 200 {
            self.data
        } else {
            None
        }
    }
}

/// One row of the surah index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub number: u32,
    /// Arabic name
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    pub number_of_ayahs: u32,
    #[serde(default)]
    pub revelation_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAyah {
    pub number_in_surah: u32,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSurah {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub revelation_type: String,
    pub number_of_ayahs: u32,
    pub ayahs: Vec<WireAyah>,
}

/// Full text of one surah, verses keyed by number within the surah
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurahText {
    pub number: u32,
    pub name: String,
    pub name_arabic: String,
    pub revelation_type: String,
    pub verse_count: u32,
    pub verses: BTreeMap<u32, String>,
}

impl From<WireSurah> for SurahText {
    fn from(wire: WireSurah) -> Self {
        Self {
            number: wire.number,
            name: wire.english_name,
            name_arabic: wire.name,
            revelation_type: wire.revelation_type,
            verse_count: wire.number_of_ayahs,
            verses: wire
                .ayahs
                .into_iter()
                .map(|ayah| (ayah.number_in_surah, ayah.text))
                .collect(),
        }
    }
}

impl SurahText {
    /// Whether the basmala header is shown above the verses
    pub fn opens_with_basmala(&self) -> bool {
        self.number != SURAH_WITHOUT_BASMALA
    }

    /// Verses in order, formatted for reading
    pub fn formatted_verses(&self) -> impl Iterator<Item = String> + '_ {
        self.verses
            .iter()
            .map(|(number, text)| format_verse(text, *number, self.number))
    }
}

/// Append the verse marker, dropping a leading basmala from verse 1
pub fn format_verse(text: &str, verse: u32, surah: u32) -> String {
    let mut body = text;
    if verse == 1 && surah != SURAH_WITHOUT_BASMALA {
        if let Some(rest) = BASMALA_VARIANTS
            .iter()
            .find_map(|variant| body.strip_prefix(variant))
        {
            body = rest.trim();
        }
    }
    format!("{body} ﴿{verse}﴾")
}

/// Wire shapes of the audio API
#[derive(Debug, Deserialize)]
pub struct RecitersResponse {
    pub reciters: Vec<WireReciter>,
}

#[derive(Debug, Deserialize)]
pub struct WireReciter {
    #[serde(deserialize_with = "number_or_string")]
    pub reciter_id: u32,
    pub reciter_name: String,
    pub reciter_short_name: String,
}

/// A reciter available for audio playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reciter {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

impl From<WireReciter> for Reciter {
    fn from(wire: WireReciter) -> Self {
        Self {
            id: wire.reciter_id,
            name: wire.reciter_name,
            short_name: wire.reciter_short_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AudioListResponse {
    pub audio_urls: Vec<AudioTrack>,
}

/// One surah recording of a reciter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    #[serde(deserialize_with = "number_or_string")]
    pub surah_id: u32,
    pub audio_url: String,
}

/// Surah and verse where each juz begins
#[rustfmt::skip]
const JUZ_STARTS: [(u32, u32); JUZ_COUNT as usize] = [
    (1, 1), (2, 142), (2, 253), (3, 93), (4, 24), (4, 148), (5, 82), (6, 111),
    (7, 88), (8, 41), (9, 93), (11, 6), (12, 53), (15, 1), (17, 1), (18, 75),
    (21, 1), (23, 1), (25, 21), (27, 56), (29, 46), (33, 31), (36, 28), (39, 32),
    (41, 47), (46, 1), (51, 31), (58, 1), (67, 1), (78, 1),
];

/// A juz division of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JuzSummary {
    pub number: u32,
    pub name: String,
    pub start_surah: u32,
    pub start_verse: u32,
    /// Last surah with verses in this juz
    pub end_surah: u32,
}

impl JuzSummary {
    /// Surahs with at least one verse in this juz
    pub fn surahs(&self) -> std::ops::RangeInclusive<u32> {
        self.start_surah..=self.end_surah
    }
}

/// The fixed list of 30 juz
pub fn juz_list() -> Vec<JuzSummary> {
    JUZ_STARTS
        .iter()
        .enumerate()
        .map(|(i, &(start_surah, start_verse))| {
            let end_surah = match JUZ_STARTS.get(i + 1) {
                Some(&(next_surah, 1)) => next_surah - 1,
                Some(&(next_surah, _)) => next_surah,
                None => SURAH_COUNT,
            };
            JuzSummary {
                number: i as u32 + 1,
                name: format!("Juz {}", i + 1),
                start_surah,
                start_verse,
                end_surah,
            }
        })
        .collect()
}

/// The audio API sends ids both as numbers and as numeric strings
fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
