//! Contextual form selection for Arabic script.
//!
//! Maps each joining letter to the presentation form (isolated, final,
//! initial or medial) dictated by its neighbours, and fuses lam + alef into
//! the mandatory ligature. Harakat are transparent to joining and are kept
//! in place.

const TATWEEL: char = '\u{0640}';
const LAM: char = '\u{0644}';

/// Presentation forms for one letter. Right-joining letters have no
/// initial or medial form.
#[derive(Debug, Clone, Copy)]
struct Forms {
    isolated: char,
    final_: char,
    initial: Option<char>,
    medial: Option<char>,
}

impl Forms {
    const fn dual(base: u32) -> Self {
        Self {
            isolated: to_char(base),
            final_: to_char(base + 1),
            initial: Some(to_char(base + 2)),
            medial: Some(to_char(base + 3)),
        }
    }

    const fn right(base: u32) -> Self {
        Self {
            isolated: to_char(base),
            final_: to_char(base + 1),
            initial: None,
            medial: None,
        }
    }

    const fn isolated_only(c: u32) -> Self {
        Self {
            isolated: to_char(c),
            final_: to_char(c),
            initial: None,
            medial: None,
        }
    }

    fn joins_forward(&self) -> bool {
        self.initial.is_some()
    }

    fn pick(&self, joins_prev: bool, joins_next: bool) -> char {
        match (joins_prev, joins_next) {
            (true, true) => self.medial.unwrap_or(self.final_),
            (true, false) => self.final_,
            (false, true) => self.initial.unwrap_or(self.isolated),
            (false, false) => self.isolated,
        }
    }
}

const fn to_char(code: u32) -> char {
    match char::from_u32(code) {
        Some(c) => c,
        None => '\u{FFFD}',
    }
}

fn forms(c: char) -> Option<Forms> {
    let forms = match c {
        '\u{0621}' => Forms::isolated_only(0xFE80),
        '\u{0622}' => Forms::right(0xFE81),
        '\u{0623}' => Forms::right(0xFE83),
        '\u{0624}' => Forms::right(0xFE85),
        '\u{0625}' => Forms::right(0xFE87),
        '\u{0626}' => Forms::dual(0xFE89),
        '\u{0627}' => Forms::right(0xFE8D),
        '\u{0628}' => Forms::dual(0xFE8F),
        '\u{0629}' => Forms::right(0xFE93),
        '\u{062A}' => Forms::dual(0xFE95),
        '\u{062B}' => Forms::dual(0xFE99),
        '\u{062C}' => Forms::dual(0xFE9D),
        '\u{062D}' => Forms::dual(0xFEA1),
        '\u{062E}' => Forms::dual(0xFEA5),
        '\u{062F}' => Forms::right(0xFEA9),
        '\u{0630}' => Forms::right(0xFEAB),
        '\u{0631}' => Forms::right(0xFEAD),
        '\u{0632}' => Forms::right(0xFEAF),
        '\u{0633}' => Forms::dual(0xFEB1),
        '\u{0634}' => Forms::dual(0xFEB5),
        '\u{0635}' => Forms::dual(0xFEB9),
        '\u{0636}' => Forms::dual(0xFEBD),
        '\u{0637}' => Forms::dual(0xFEC1),
        '\u{0638}' => Forms::dual(0xFEC5),
        '\u{0639}' => Forms::dual(0xFEC9),
        '\u{063A}' => Forms::dual(0xFECD),
        '\u{0641}' => Forms::dual(0xFED1),
        '\u{0642}' => Forms::dual(0xFED5),
        '\u{0643}' => Forms::dual(0xFED9),
        '\u{0644}' => Forms::dual(0xFEDD),
        '\u{0645}' => Forms::dual(0xFEE1),
        '\u{0646}' => Forms::dual(0xFEE5),
        '\u{0647}' => Forms::dual(0xFEE9),
        '\u{0648}' => Forms::right(0xFEED),
        '\u{0649}' => Forms::right(0xFEEF),
        '\u{064A}' => Forms::dual(0xFEF1),
        // Persian and Urdu letters.
        '\u{067E}' => Forms::dual(0xFB56),
        '\u{0686}' => Forms::dual(0xFB7A),
        '\u{0698}' => Forms::right(0xFB8A),
        '\u{06A9}' => Forms::dual(0xFB8E),
        '\u{06AF}' => Forms::dual(0xFB92),
        '\u{06CC}' => Forms::dual(0xFBFC),
        _ => return None,
    };
    Some(forms)
}

/// Lam-alef ligature forms (isolated, final) for the alef following a lam.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Harakat and other combining marks that do not break joining.
fn is_transparent(c: char) -> bool {
    matches!(
        c,
        '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}'
    )
}

/// Whether `c` connects to a following letter.
fn joins_forward(c: char) -> bool {
    c == TATWEEL || forms(c).is_some_and(|f| f.joins_forward())
}

/// Whether `c` connects to a preceding letter.
fn joins_backward(c: char) -> bool {
    c == TATWEEL || forms(c).is_some_and(|f| f.initial.is_some() || f.final_ != f.isolated)
}

fn prev_letter(chars: &[char], i: usize) -> Option<char> {
    chars[..i].iter().rev().copied().find(|c| !is_transparent(*c))
}

fn next_letter(chars: &[char], i: usize) -> Option<(usize, char)> {
    chars
        .iter()
        .enumerate()
        .skip(i + 1)
        .find(|(_, c)| !is_transparent(**c))
        .map(|(j, c)| (j, *c))
}

/// Replace Arabic letters with their contextual presentation forms.
///
/// Output stays in logical order; reordering is a separate step.
#[must_use]
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let Some(letter) = forms(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let joins_prev = letter.final_ != letter.isolated
            && prev_letter(&chars, i).is_some_and(joins_forward);
        let next = next_letter(&chars, i);

        if c == LAM {
            if let Some((j, ligature)) =
                next.and_then(|(j, alef)| lam_alef(alef).map(|lig| (j, lig)))
            {
                let (isolated, final_) = ligature;
                out.push(if joins_prev { final_ } else { isolated });
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }

        let joins_next =
            letter.joins_forward() && next.is_some_and(|(_, n)| joins_backward(n));
        out.push(letter.pick(joins_prev, joins_next));
        i += 1;
    }

    out
}
