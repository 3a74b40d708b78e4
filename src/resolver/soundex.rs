//! American Soundex keys, applied per word and joined, used as the last
//! resolution step for misspelled provider names.

fn digit(c: char) -> Option<char> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

/// Four-character Soundex code of a single word, or `None` when the word has
/// no ASCII letters.
pub fn soundex(word: &str) -> Option<String> {
    let mut letters = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase());

    let first = letters.next()?;
    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());

    let mut last = digit(first);
    for c in letters {
        let current = digit(c);
        match current {
            Some(d) if current != last => {
                code.push(d);
                if code.len() == 4 {
                    break;
                }
            }
            _ => {}
        }
        // 'h' and 'w' do not separate letters with the same code
        if c != 'h' && c != 'w' {
            last = current;
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    Some(code)
}

/// Phonetic key of a whole (already normalized) name: word codes joined by spaces.
pub fn phonetic_key(normalized: &str) -> Option<String> {
    let codes: Vec<String> = normalized.split_whitespace().filter_map(soundex).collect();
    if codes.is_empty() {
        None
    } else {
        Some(codes.join(" "))
    }
}
