//! Text canonicalization for fuzzy matching.
//!
//! Local tags and uta-net listings disagree on width (ＹＯＡＳＯＢＩ vs
//! YOASOBI), decoration (♪, ★, 「」) and case.  `normalize` folds all of
//! that away so the similarity scorer compares content, not formatting.

use unicode_normalization::UnicodeNormalization;

/// Punctuation kept through normalization because it carries meaning in
/// titles ("Don't", "Re:Birth", "feat.", parenthesised versions).  Both
/// ASCII and fullwidth parentheses are listed; NFKC folds the fullwidth
/// pair onto the ASCII one.
const RETAINED_PUNCTUATION: [char; 7] = ['\'', ':', '.', '(', ')', '（', '）'];

/// Canonicalize a raw label for comparison.
///
/// NFKC-folds width variants, drops symbol and punctuation characters
/// (except [`RETAINED_PUNCTUATION`]), lowercases and trims.  Idempotent:
/// normalizing an already-normalized string returns it unchanged.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    let kept: String = folded
        .chars()
        .filter(|&c| RETAINED_PUNCTUATION.contains(&c) || !is_symbol_or_punctuation(c))
        .collect();
    kept.to_lowercase().trim().to_string()
}

/// Character classes stripped by [`normalize`].  The input has already been
/// NFKC-folded, so fullwidth ASCII variants, circled digits, roman numerals
/// and similar compatibility forms never reach this check.
fn is_symbol_or_punctuation(c: char) -> bool {
    match c {
        // ASCII punctuation and symbols
        '!'..='/' | ':'..='@' | '['..='`' | '{'..='~' => true,
        // Latin-1 punctuation, currency and signs
        '\u{A1}'..='\u{BF}' | '×' | '÷' => true,
        // General punctuation: dashes, curly quotes, daggers, bullets
        '\u{2010}'..='\u{205E}' => true,
        // Currency signs
        '\u{20A0}'..='\u{20CF}' => true,
        // Letterlike leftovers, arrows, math operators, geometric shapes,
        // miscellaneous symbols (♪ ★ ♡), dingbats
        '\u{2100}'..='\u{2BFF}' => true,
        // Supplemental punctuation
        '\u{2E00}'..='\u{2E7F}' => true,
        // CJK punctuation: 、。〃〄 brackets 〈〉《》「」『』【】 marks 〒〓
        // wave dash 〜 and part signs, skipping the iteration/repeat marks
        // and Hangzhou numerals interleaved in the same block
        '\u{3001}'..='\u{3004}'
        | '\u{3008}'..='\u{3020}'
        | '\u{3030}'
        | '\u{3036}'..='\u{3037}'
        | '\u{303D}'..='\u{303F}' => true,
        // Katakana middle dot (the prolonged sound mark ー stays, it is
        // part of the word)
        '\u{30FB}' => true,
        // Mahjong tiles through emoji
        '\u{1F000}'..='\u{1FAFF}' => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent() {
        let samples = [
            "夜に駆ける (Live Ver.)",
            "米津玄師 / Kenshi Yonezu",
            "  YOASOBI  ",
            "♪ハルジオン♪",
            "Don't Stop Me Now",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_width_folding() {
        assert_eq!(normalize("Ｆｕｌｌ　Ｗｉｄｔｈ"), "full width");
        assert_eq!(normalize("１２３"), normalize("123"));
        assert_eq!(normalize("ＹＯＡＳＯＢＩ"), "yoasobi");
    }

    #[test]
    fn test_strips_decorative_symbols() {
        assert_eq!(normalize("夜に駆ける★"), "夜に駆ける");
        assert_eq!(normalize("♪ハルジオン♪"), "ハルジオン");
        assert_eq!(normalize("「群青」"), "群青");
        assert_eq!(normalize("米津玄師・ハチ"), "米津玄師ハチ");
        // Wave dash and fullwidth tilde both vanish
        assert_eq!(normalize("ツバメ〜大空へ"), "ツバメ大空へ");
    }

    #[test]
    fn test_retained_punctuation() {
        assert_eq!(normalize("Don't Stop Me Now"), "don't stop me now");
        assert_eq!(normalize("Re:Birth"), "re:birth");
        assert_eq!(normalize("feat. Ado"), "feat. ado");
        assert_eq!(normalize("夜に駆ける (Live Ver.)"), "夜に駆ける (live ver.)");
        // Fullwidth parentheses fold to ASCII ones and survive
        assert_eq!(normalize("紅蓮華（TVサイズ）"), "紅蓮華(tvサイズ)");
    }

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(normalize("  Lemon  "), "lemon");
        assert_eq!(normalize("KICK BACK"), "kick back");
    }

    #[test]
    fn test_letters_in_cjk_symbol_block_survive() {
        // Iteration mark and prolonged sound mark are word characters
        assert_eq!(normalize("代々木"), "代々木");
        assert_eq!(normalize("スーパー"), "スーパー");
    }

    #[test]
    fn test_symbol_only_input_normalizes_to_empty() {
        assert_eq!(normalize("★☆♪"), "");
        assert_eq!(normalize("!!??"), "");
        assert_eq!(normalize(""), "");
    }
}
