//! Static key alias tables.
//!
//! Responsibilities:
//! - Map key-name synonyms (`control`, `cmd`, `ArrowUp`, `Esc`) onto canonical names.
//! - Describe which symbols a key produces while shift is held, including
//!   UK layout variants.
//! - Translate legacy numeric key codes into canonical names.
//!
//! Does NOT handle:
//! - Splitting key-map strings into chords and sequences (see `combination`).
//! - Tracking which keys are held (see the core crate).
//!
//! Invariants:
//! - Tables are immutable and compiled in; lookups never allocate for named keys.
//! - Synonym lookups are case-insensitive.

use phf::phf_map;

use super::KeyName;

/// Synonyms for named (multi-character) keys, keyed by lowercase spelling.
static SYNONYMS: phf::Map<&'static str, &'static str> = phf_map! {
    // Modifiers
    "shift" => "shift",
    "ctrl" => "ctrl", "control" => "ctrl", "ctl" => "ctrl",
    "alt" => "alt", "option" => "alt", "opt" => "alt", "altgraph" => "alt",
    "meta" => "meta", "cmd" => "meta", "command" => "meta", "super" => "meta",
    "win" => "meta", "os" => "meta",
    // Editing and whitespace
    "enter" => "enter", "return" => "enter",
    "esc" => "escape", "escape" => "escape",
    "space" => "space", "spacebar" => "space",
    "tab" => "tab",
    "backspace" => "backspace",
    "del" => "delete", "delete" => "delete",
    "ins" => "insert", "insert" => "insert",
    "capslock" => "capslock",
    "plus" => "plus",
    "hash" => "#",
    // Navigation
    "home" => "home", "end" => "end",
    "pageup" => "pageup", "pgup" => "pageup", "page_up" => "pageup",
    "pagedown" => "pagedown", "pgdn" => "pagedown", "page_down" => "pagedown",
    "up" => "up", "arrowup" => "up",
    "down" => "down", "arrowdown" => "down",
    "left" => "left", "arrowleft" => "left",
    "right" => "right", "arrowright" => "right",
    // Function keys
    "f1" => "f1", "f2" => "f2", "f3" => "f3", "f4" => "f4", "f5" => "f5",
    "f6" => "f6", "f7" => "f7", "f8" => "f8", "f9" => "f9", "f10" => "f10",
    "f11" => "f11", "f12" => "f12", "f13" => "f13", "f14" => "f14", "f15" => "f15",
    "f16" => "f16", "f17" => "f17", "f18" => "f18", "f19" => "f19", "f20" => "f20",
};

/// Legacy numeric key codes (the `keyCode` property of older platforms).
static KEY_CODES: phf::Map<u32, &'static str> = phf_map! {
    8u32 => "backspace", 9u32 => "tab", 13u32 => "enter",
    16u32 => "shift", 17u32 => "ctrl", 18u32 => "alt", 20u32 => "capslock",
    27u32 => "escape", 32u32 => "space",
    33u32 => "pageup", 34u32 => "pagedown", 35u32 => "end", 36u32 => "home",
    37u32 => "left", 38u32 => "up", 39u32 => "right", 40u32 => "down",
    45u32 => "insert", 46u32 => "delete",
    48u32 => "0", 49u32 => "1", 50u32 => "2", 51u32 => "3", 52u32 => "4",
    53u32 => "5", 54u32 => "6", 55u32 => "7", 56u32 => "8", 57u32 => "9",
    65u32 => "a", 66u32 => "b", 67u32 => "c", 68u32 => "d", 69u32 => "e",
    70u32 => "f", 71u32 => "g", 72u32 => "h", 73u32 => "i", 74u32 => "j",
    75u32 => "k", 76u32 => "l", 77u32 => "m", 78u32 => "n", 79u32 => "o",
    80u32 => "p", 81u32 => "q", 82u32 => "r", 83u32 => "s", 84u32 => "t",
    85u32 => "u", 86u32 => "v", 87u32 => "w", 88u32 => "x", 89u32 => "y",
    90u32 => "z",
    91u32 => "meta", 92u32 => "meta", 93u32 => "meta", 224u32 => "meta",
    112u32 => "f1", 113u32 => "f2", 114u32 => "f3", 115u32 => "f4",
    116u32 => "f5", 117u32 => "f6", 118u32 => "f7", 119u32 => "f8",
    120u32 => "f9", 121u32 => "f10", 122u32 => "f11", 123u32 => "f12",
    124u32 => "f13", 125u32 => "f14", 126u32 => "f15", 127u32 => "f16",
    128u32 => "f17", 129u32 => "f18", 130u32 => "f19", 131u32 => "f20",
    186u32 => ";", 187u32 => "=", 188u32 => ",", 189u32 => "-",
    190u32 => ".", 191u32 => "/", 192u32 => "`",
    219u32 => "[", 220u32 => "\\", 221u32 => "]", 222u32 => "'",
};

/// Symbols a physical key produces while shift is held.
///
/// Keys with more than one entry differ between US and UK layouts.
pub fn shifted_symbols(key: &str) -> &'static [&'static str] {
    match key {
        "`" => &["~"],
        "1" => &["!"],
        "2" => &["@", "\""],
        "3" => &["#", "£"],
        "4" => &["$"],
        "5" => &["%"],
        "6" => &["^"],
        "7" => &["&"],
        "8" => &["*"],
        "9" => &["("],
        "0" => &[")"],
        "-" => &["_"],
        "=" => &["plus"],
        ";" => &[":"],
        "'" => &["\"", "@"],
        "," => &["<"],
        "." => &[">"],
        "/" => &["?"],
        "\\" => &["|"],
        "[" => &["{"],
        "]" => &["}"],
        "#" => &["~"],
        _ => &[],
    }
}

/// Every physical key that produces `symbol` under shift, US layout first.
pub fn unshifted_keys(symbol: &str) -> &'static [&'static str] {
    match symbol {
        "~" => &["`", "#"],
        "!" => &["1"],
        "@" => &["2", "'"],
        "#" | "£" => &["3"],
        "$" => &["4"],
        "%" => &["5"],
        "^" => &["6"],
        "&" => &["7"],
        "*" => &["8"],
        "(" => &["9"],
        ")" => &["0"],
        "_" => &["-"],
        "plus" => &["="],
        ":" => &[";"],
        "\"" => &["'", "2"],
        "<" => &[","],
        ">" => &["."],
        "?" => &["/"],
        "|" => &["\\"],
        "{" => &["["],
        "}" => &["]"],
        _ => &[],
    }
}

/// The physical key that most commonly (US layout first) produces `symbol` under shift.
pub fn unshifted(symbol: &str) -> Option<KeyName> {
    unshifted_keys(symbol)
        .first()
        .map(|base| KeyName::from_static(*base))
}

/// True if `name` is only reachable with shift held on some layout.
pub fn is_shifted_symbol(name: &str) -> bool {
    !unshifted_keys(name).is_empty()
}

/// Canonicalize a single key token.
///
/// Returns `None` for names that are neither a known synonym nor a single
/// character. Letters are lowercased; callers that care whether an
/// uppercase letter implied shift must check before calling.
pub fn canonicalize(token: &str) -> Option<KeyName> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(canonical_char(c));
    }

    let lower = token.to_ascii_lowercase();
    if lower == "mod" {
        return Some(platform_mod());
    }
    SYNONYMS.get(lower.as_str()).map(|name| KeyName::from_static(name))
}

/// Canonical name for a legacy numeric key code.
pub fn from_key_code(code: u32) -> Option<KeyName> {
    KEY_CODES.get(&code).map(|name| KeyName::from_static(name))
}

/// Every name a key can stand for given the shift state.
///
/// The key always represents itself. With shift held it also represents the
/// symbols it produces and, when it is itself a symbol, every physical key
/// that produces it. `#` is both: a UK key shifting to `~` and the shifted
/// form of `3`.
pub fn resolve(key: &KeyName, shift_held: bool) -> Vec<KeyName> {
    let mut names = vec![key.clone()];
    if !shift_held {
        return names;
    }
    let related = shifted_symbols(key.as_str())
        .iter()
        .chain(unshifted_keys(key.as_str()));
    for name in related {
        if !names.iter().any(|n| n.as_str() == *name) {
            names.push(KeyName::from_static(*name));
        }
    }
    names
}

fn canonical_char(c: char) -> KeyName {
    match c {
        '+' => KeyName::from_static("plus"),
        ' ' => KeyName::from_static("space"),
        c if c.is_ascii_uppercase() => KeyName::owned(c.to_ascii_lowercase().to_string()),
        c => KeyName::owned(c.to_string()),
    }
}

fn platform_mod() -> KeyName {
    if cfg!(target_os = "macos") {
        KeyName::META
    } else {
        KeyName::CTRL
    }
}
