//! Journal name normalization.
//!
//! Two names that normalize to the same key are treated as the same journal
//! whenever no ISSN is available. The mapping is intentionally lossy: it
//! folds diacritics, lowercases, strips edition qualifiers and noise tokens,
//! and collapses punctuation. It never touches distinguishing words
//! ("journal of" is kept).

/// Tokens removed wherever they appear in a name. Kept deliberately short;
/// growing this list trades precision for recall.
pub const NOISE_TOKENS: &[&str] = &["the"];

/// Bracketed qualifiers stripped together with their brackets. These mark
/// print/electronic editions of the same journal in the source data.
pub const EDITION_QUALIFIERS: &[&str] = &["print", "online", "electronic", "internet"];

/// Words kept lowercase when title-casing a display name, unless they start
/// the name.
const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "de", "der", "des", "di", "du", "for", "fur", "in", "la",
    "le", "of", "on", "or", "the", "und", "van", "von",
];

/// Map a raw journal name to its canonical matching key.
///
/// Deterministic, total and idempotent: `normalize(normalize(s)) ==
/// normalize(s)` for any input.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let folded: String = lowered.chars().map(fold_diacritic).collect();
    let stripped = strip_edition_qualifiers(&folded);

    let mut collapsed = String::with_capacity(stripped.len());
    for ch in stripped.chars() {
        if ch.is_alphanumeric() {
            collapsed.push(ch);
        } else if ch == '&' {
            collapsed.push_str(" and ");
        } else {
            collapsed.push(' ');
        }
    }

    let words = collapsed
        .split_whitespace()
        .filter(|word| !NOISE_TOKENS.contains(word))
        .collect::<Vec<_>>();

    words.join(" ")
}

/// Title-case a normalized key into a display name.
pub fn display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in key.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if i > 0 && SMALL_WORDS.contains(&word) {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.extend(chars);
            }
        }
    }
    out
}

/// Remove bracketed groups whose content is a known edition qualifier,
/// e.g. `"nature (print)"` becomes `"nature "`. Other bracketed content is
/// kept (brackets themselves are collapsed later).
fn strip_edition_qualifiers(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find('(') {
        let (before, after_open) = rest.split_at(open);
        out.push_str(before);
        match after_open[1..].find(')') {
            Some(close) => {
                let inner = &after_open[1..1 + close];
                if !EDITION_QUALIFIERS.contains(&inner.trim()) {
                    out.push_str(&after_open[..close + 2]);
                }
                rest = &after_open[close + 2..];
            }
            None => {
                // Unbalanced bracket, keep as-is.
                out.push_str(after_open);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ł' | 'ľ' | 'ĺ' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ş' | 'š' | 'ș' => 's',
        'ţ' | 'ť' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ŭ' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
