//! File-name sanitizing for downloaded episode titles.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

const TURKISH_MAP: [(char, char); 12] = [
    ('ı', 'i'),
    ('İ', 'I'),
    ('ğ', 'g'),
    ('Ğ', 'G'),
    ('ü', 'u'),
    ('Ü', 'U'),
    ('ş', 's'),
    ('Ş', 'S'),
    ('ö', 'o'),
    ('Ö', 'O'),
    ('ç', 'c'),
    ('Ç', 'C'),
];

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\-.]").expect("Invalid file name pattern"))
}

fn underscore_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("Invalid underscore pattern"))
}

/// Turn a video title into an ASCII file stem.
///
/// Turkish letters map to their ASCII counterparts, the rest is NFKD-decomposed
/// with non-ASCII code points dropped, any character outside `[A-Za-z0-9_.-]` becomes `_`, and runs of `_` collapse.
pub fn sanitize_filename(title: &str) -> String {
    let mapped: String = title
        .chars()
        .map(|c| {
            TURKISH_MAP
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect();

    let ascii: String = mapped.to_lowercase().nfkd().filter(char::is_ascii).collect();

    let replaced = ascii.replace(' ', "_");
    let replaced = invalid_chars().replace_all(&replaced, "_");
    let collapsed = underscore_runs().replace_all(&replaced, "_");

    collapsed.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turkish_title() {
        assert_eq!(
            sanitize_filename("DataCommit #7: Murat Şahin ile Veri Bilimi Kariyeri"),
            "datacommit_7_murat_sahin_ile_veri_bilimi_kariyeri"
        );
        assert_eq!(sanitize_filename("Göker Güner | İstanbul"), "goker_guner_istanbul");
        assert_eq!(sanitize_filename("IŞIK ÇAĞI"), "isik_cagi");
    }

    #[test]
    fn test_accents_and_symbols() {
        assert_eq!(sanitize_filename("Café Déjà-vu v2.0"), "cafe_deja-vu_v2.0");
        assert_eq!(sanitize_filename("__a  --  b__"), "a_--_b");
        assert_eq!(sanitize_filename("emoji 🎙️ bölüm"), "emoji_bolum");
    }

    #[test]
    fn test_compatibility_decomposition() {
        assert_eq!(sanitize_filename("Phở Việt"), "pho_viet");
        assert_eq!(sanitize_filename("ﬁnal"), "final");
        assert_eq!(sanitize_filename("Ｅｐ２"), "ep2");
        assert_eq!(sanitize_filename("x²"), "x2");
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(sanitize_filename("???"), "");
        assert_eq!(sanitize_filename(""), "");
    }
}
