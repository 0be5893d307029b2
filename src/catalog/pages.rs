//! Printed mushaf page layout: which pages each surah spans

use super::model::SURAH_COUNT;

/// Pages in the printed mushaf
pub const TOTAL_PAGES: u32 = 604;

/// First and last page of each surah, indexed by surah number - 1
#[rustfmt::skip]
const SURAH_PAGES: [(u32, u32); SURAH_COUNT as usize] = [
    (1, 1), (2, 49), (50, 76), (77, 106), (106, 127), (128, 150),
    (151, 176), (177, 186), (187, 207), (208, 221), (221, 235), (235, 248),
    (249, 255), (255, 261), (262, 267), (267, 281), (282, 293), (293, 304),
    (305, 312), (312, 321), (322, 331), (332, 341), (342, 349), (350, 358),
    (359, 366), (367, 376), (377, 385), (385, 396), (396, 404), (404, 410),
    (411, 414), (415, 417), (418, 427), (428, 434), (434, 440), (440, 445),
    (446, 452), (453, 458), (458, 467), (467, 476), (477, 482), (483, 488),
    (489, 495), (496, 498), (499, 502), (502, 506), (507, 510), (511, 514),
    (515, 517), (518, 520), (520, 523), (523, 525), (526, 528), (528, 531),
    (531, 534), (534, 537), (537, 541), (542, 545), (545, 548), (549, 551),
    (551, 552), (553, 554), (554, 555), (556, 557), (558, 559), (560, 561),
    (562, 564), (564, 566), (566, 568), (568, 570), (570, 571), (572, 573),
    (574, 575), (575, 577), (577, 578), (578, 580), (580, 581), (582, 583),
    (583, 584), (585, 585), (586, 586), (587, 587), (587, 589), (589, 590),
    (590, 591), (591, 591), (592, 592), (592, 593), (593, 594), (594, 595),
    (595, 595), (595, 596), (596, 596), (596, 596), (597, 597), (597, 598),
    (598, 598), (598, 599), (599, 599), (599, 600), (600, 600), (600, 600),
    (601, 601), (601, 601), (601, 602), (602, 602), (602, 602), (602, 602),
    (603, 603), (603, 603), (603, 603), (604, 604), (604, 604), (604, 604),
];

/// Inclusive page span of one surah
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, page: u32) -> bool {
        (self.first..=self.last).contains(&page)
    }

    /// 1-based position of `page` within the range
    pub fn position(&self, page: u32) -> Option<u32> {
        self.contains(page).then(|| page - self.first + 1)
    }

    /// Clamp a page into the range
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(self.first, self.last)
    }
}

/// Page span of a surah, `None` outside 1..=114
pub fn surah_pages(surah: u32) -> Option<PageRange> {
    let index = surah.checked_sub(1)? as usize;
    SURAH_PAGES
        .get(index)
        .map(|&(first, last)| PageRange { first, last })
}

/// Whether `page` exists in the printed mushaf
pub fn is_valid_page(page: u32) -> bool {
    (1..=TOTAL_PAGES).contains(&page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_and_within_bounds() {
        let mut previous_first = 0;
        for surah in 1..=SURAH_COUNT {
            let range = surah_pages(surah).unwrap();
            assert!(range.first <= range.last, "surah {surah}");
            assert!(range.first >= previous_first, "surah {surah}");
            assert!(is_valid_page(range.first) && is_valid_page(range.last));
            previous_first = range.first;
        }
    }

    #[test]
    fn out_of_range_surahs_have_no_pages() {
        assert!(surah_pages(0).is_none());
        assert!(surah_pages(115).is_none());
    }

    #[test]
    fn position_within_surah() {
        let baqarah = surah_pages(2).unwrap();
        assert_eq!(baqarah.len(), 48);
        assert_eq!(baqarah.position(2), Some(1));
        assert_eq!(baqarah.position(49), Some(48));
        assert_eq!(baqarah.position(50), None);
        assert_eq!(baqarah.clamp(70), 49);
    }
}
