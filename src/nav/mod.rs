//! Stateless navigation
//!
//! Every button carries a [`NavigationToken`]: a short string naming the
//! view to render next plus up to three integers. Decoding a token needs
//! nothing but the token itself, so navigation survives restarts and
//! never consults a session store.
//!
//! # Token format
//!
//! ```text
//! tag[:n[:n[:n]]]
//! ```
//!
//! `tag` selects a [`ViewKind`]; the number and meaning of the integer
//! fields are fixed per view (see [`ViewKind::fields`]).

pub mod codec;
pub mod router;

pub use codec::{NavigationCodec, NavigationToken, DELIMITER};
pub use router::{Dispatch, Router, ViewHandler};

use serde::Serialize;
use std::fmt;

/// Integer slots of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    Primary,
    Secondary,
    Page,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Page => "page",
        }
    }
}

/// Every view a token can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ViewKind {
    MainMenu,
    /// Paged list of surahs
    SurahIndex,
    /// Surah detail with actions
    Surah,
    /// First chunk of a surah's text
    ReadSurah,
    /// Later chunk of a surah's text, from a byte offset
    ContinueReading,
    /// Entry point to a surah's page images
    SurahImages,
    /// One mushaf page image within a surah
    PageImage,
    /// Paged list of surahs for listening
    AudioIndex,
    /// Paged reciters for one surah
    Reciters,
    PlayAudio,
    JuzIndex,
    Juz,
    Search,
    CheckSubscription,
}

impl ViewKind {
    pub const ALL: [ViewKind; 14] = [
        Self::MainMenu,
        Self::SurahIndex,
        Self::Surah,
        Self::ReadSurah,
        Self::ContinueReading,
        Self::SurahImages,
        Self::PageImage,
        Self::AudioIndex,
        Self::Reciters,
        Self::PlayAudio,
        Self::JuzIndex,
        Self::Juz,
        Self::Search,
        Self::CheckSubscription,
    ];

    /// Short tag written at the front of a token
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MainMenu => "menu",
            Self::SurahIndex => "idx",
            Self::Surah => "sura",
            Self::ReadSurah => "read",
            Self::ContinueReading => "cont",
            Self::SurahImages => "imgs",
            Self::PageImage => "page",
            Self::AudioIndex => "aidx",
            Self::Reciters => "recs",
            Self::PlayAudio => "play",
            Self::JuzIndex => "jidx",
            Self::Juz => "juz",
            Self::Search => "srch",
            Self::CheckSubscription => "sub",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.tag() == tag)
    }

    /// Integer fields the view carries, in token order
    pub fn fields(&self) -> &'static [Field] {
        use Field::*;
        match self {
            Self::MainMenu | Self::Search | Self::CheckSubscription => &[],
            Self::SurahIndex | Self::AudioIndex | Self::JuzIndex => &[Page],
            Self::Surah | Self::ReadSurah | Self::SurahImages | Self::Juz => &[Primary],
            Self::ContinueReading | Self::PageImage | Self::PlayAudio => &[Primary, Secondary],
            Self::Reciters => &[Primary, Page],
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Decoded form of a token: which view, with which arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NavigationIntent {
    pub view: ViewKind,
    pub primary: Option<u32>,
    pub secondary: Option<u32>,
    pub page: Option<u32>,
}

impl NavigationIntent {
    pub fn new(view: ViewKind) -> Self {
        Self {
            view,
            primary: None,
            secondary: None,
            page: None,
        }
    }

    pub fn with_primary(mut self, value: u32) -> Self {
        self.primary = Some(value);
        self
    }

    pub fn with_secondary(mut self, value: u32) -> Self {
        self.secondary = Some(value);
        self
    }

    pub fn with_page(mut self, value: u32) -> Self {
        self.page = Some(value);
        self
    }

    pub fn get(&self, field: Field) -> Option<u32> {
        match field {
            Field::Primary => self.primary,
            Field::Secondary => self.secondary,
            Field::Page => self.page,
        }
    }

    fn set(&mut self, field: Field, value: u32) {
        match field {
            Field::Primary => self.primary = Some(value),
            Field::Secondary => self.secondary = Some(value),
            Field::Page => self.page = Some(value),
        }
    }

    pub fn main_menu() -> Self {
        Self::new(ViewKind::MainMenu)
    }

    pub fn surah_index(page: u32) -> Self {
        Self::new(ViewKind::SurahIndex).with_page(page)
    }

    pub fn surah(surah: u32) -> Self {
        Self::new(ViewKind::Surah).with_primary(surah)
    }

    pub fn read_surah(surah: u32) -> Self {
        Self::new(ViewKind::ReadSurah).with_primary(surah)
    }

    pub fn continue_reading(surah: u32, offset: u32) -> Self {
        Self::new(ViewKind::ContinueReading)
            .with_primary(surah)
            .with_secondary(offset)
    }

    pub fn surah_images(surah: u32) -> Self {
        Self::new(ViewKind::SurahImages).with_primary(surah)
    }

    pub fn page_image(page: u32, surah: u32) -> Self {
        Self::new(ViewKind::PageImage)
            .with_primary(page)
            .with_secondary(surah)
    }

    pub fn audio_index(page: u32) -> Self {
        Self::new(ViewKind::AudioIndex).with_page(page)
    }

    pub fn reciters(surah: u32, page: u32) -> Self {
        Self::new(ViewKind::Reciters)
            .with_primary(surah)
            .with_page(page)
    }

    pub fn play_audio(reciter: u32, surah: u32) -> Self {
        Self::new(ViewKind::PlayAudio)
            .with_primary(reciter)
            .with_secondary(surah)
    }

    pub fn juz_index(page: u32) -> Self {
        Self::new(ViewKind::JuzIndex).with_page(page)
    }

    pub fn juz(juz: u32) -> Self {
        Self::new(ViewKind::Juz).with_primary(juz)
    }

    pub fn search() -> Self {
        Self::new(ViewKind::Search)
    }

    pub fn check_subscription() -> Self {
        Self::new(ViewKind::CheckSubscription)
    }
}
