//! Text normalization
//!
//! Cleans scraped or pasted ingredient text before any number is read from
//! it. Every function here is total and idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Leading "<number> <unit> of" prefix. Units must end on a word boundary so
/// that "garlic" does not lose its "g" and "large" does not lose its "l".
static LEADING_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d[\d.,/\s-]*)?\s*(?:(?:cups?|c|tbsps?|tbs|tablespoons?|tsps?|teaspoons?|oz|ounces?|pounds?|lbs?|grams?|g|kgs?|kilograms?|ml|millilit(?:er|re)s?|lit(?:er|re)s?|l)\b\.?)?\s*(?:of\s+)?",
    )
    .expect("leading quantity pattern is valid")
});

/// Unicode vulgar fractions and their ASCII spelling
const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Named HTML entities seen in recipe markup
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("shy", '\u{00AD}'),
    ("frac12", '½'),
    ("frac14", '¼'),
    ("frac34", '¾'),
    ("frasl", '\u{2044}'),
    ("deg", '°'),
    ("times", '×'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("hellip", '…'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("eacute", 'é'),
    ("egrave", 'è'),
    ("ecirc", 'ê'),
    ("aacute", 'á'),
    ("agrave", 'à'),
    ("iacute", 'í'),
    ("oacute", 'ó'),
    ("uacute", 'ú'),
    ("ntilde", 'ñ'),
    ("ccedil", 'ç'),
    ("auml", 'ä'),
    ("ouml", 'ö'),
    ("uuml", 'ü'),
    ("szlig", 'ß'),
];

/// Longest entity body we try to resolve ("#x10FFFF" is eight characters)
const MAX_ENTITY_LEN: usize = 10;

/// Characters that render as nothing and split words when left in place
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}' | '\u{061C}' | '\u{180E}'
    )
}

/// Remove zero-width characters and collapse every Unicode space variant to
/// a single ASCII space, then trim.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if is_invisible(c) {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Resolve numeric (`&#189;`, `&#xBD;`) and named (`&frac12;`) HTML entities.
///
/// Decoding repeats until nothing changes, so double-encoded markup such as
/// `&amp;frac12;` ends up fully decoded.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = decode_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn decode_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| resolve_entity(&tail[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).filter(|&c| c != '\0');
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|&(_, c)| c)
}

/// Replace Unicode vulgar fractions with `n/d`.
///
/// A glyph glued to a whole number ("1½") gets a separating space so the
/// result reads as a mixed number ("1 1/2"). The fraction slash U+2044 becomes
/// an ASCII slash.
pub fn fractions_to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if let Some((_, ascii)) = VULGAR_FRACTIONS.iter().find(|(glyph, _)| *glyph == c) {
            if out.chars().last().is_some_and(|prev| prev.is_ascii_digit()) {
                out.push(' ');
            }
            out.push_str(ascii);
        } else if c == '\u{2044}' {
            out.push('/');
        } else {
            out.push(c);
        }
    }
    out
}

/// Strip a leading "<number> <unit> of" prefix to leave the bare ingredient
/// name. Never returns an empty name: when nothing would remain, the decoded
/// input is returned instead.
pub fn strip_leading_quantity(text: &str) -> String {
    let decoded = decode_entities(text);
    let original = decoded.trim();
    let mut current = original.to_string();
    loop {
        let stripped = LEADING_QUANTITY.replace(&current, "").trim().to_string();
        if stripped.is_empty() {
            return original.to_string();
        }
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

/// Clean one scraped ingredient line: ASCII fractions, single spaces.
pub fn clean_line(text: &str) -> String {
    normalize_whitespace(&fractions_to_ascii(text))
}

/// Lookup key for nutrition and glossary tables ("Olive Oil (extra virgin)" -> "olive_oil_extra_virgin")
pub fn normalize_key(text: &str) -> String {
    join_alnum_runs(text, '_')
}

/// URL-safe recipe id ("Banana Bread!" -> "banana-bread")
pub fn slugify(name: &str) -> String {
    let slug = join_alnum_runs(name, '-');
    if slug.is_empty() {
        "recipe".to_string()
    } else {
        slug
    }
}

fn join_alnum_runs(text: &str, sep: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push(sep);
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}
