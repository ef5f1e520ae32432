// Numeric quantities preceding an abbreviation ("50000 mt", "1,500mts", "0.5 mt")

/// Quantities below this count as singular when rendering the full form
pub const SINGULAR_LIMIT: f64 = 1.01;

/// Scan a numeric token starting at `start`; returns the byte offset past it.
///
/// Grammar: `digits ("," three-digits)* ("." digits)?`. The caller checks the
/// left word boundary.
pub fn scan_quantity(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits_from = |from: usize| -> usize {
        let mut pos = from;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };

    let mut pos = digits_from(start);
    if pos == start {
        return None;
    }

    while bytes.get(pos) == Some(&b',') {
        let group_end = digits_from(pos + 1);
        if group_end - (pos + 1) != 3 {
            break;
        }
        pos = group_end;
    }

    if bytes.get(pos) == Some(&b'.') {
        let fraction_end = digits_from(pos + 1);
        if fraction_end > pos + 1 {
            pos = fraction_end;
        }
    }

    Some(pos)
}

/// Numeric value of a quantity token, `None` when it does not parse
pub fn parse_quantity(token: &str) -> Option<f64> {
    token.replace(',', "").parse::<f64>().ok()
}

/// True when the quantity reads as singular ("1 ton", "0.5 ton")
pub fn is_singular(token: &str) -> bool {
    parse_quantity(token).is_some_and(|value| value < SINGULAR_LIMIT)
}

/// Replace every whole word "tons" (any case) with its singular, keeping the case of the stem
pub fn singularize_tons(full_form: &str) -> String {
    const WORD: &str = "tons";

    let mut result = String::with_capacity(full_form.len());
    let mut cursor = 0;
    let mut pos = 0;

    while pos < full_form.len() {
        let is_word = full_form
            .get(pos..pos + WORD.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(WORD))
            && crate::dictionary::has_left_boundary(full_form, pos)
            && crate::dictionary::has_right_boundary(full_form, pos + WORD.len());

        if is_word {
            result.push_str(&full_form[cursor..pos]);
            // drop the trailing "s"
            result.push_str(&full_form[pos..pos + WORD.len() - 1]);
            pos += WORD.len();
            cursor = pos;
            continue;
        }

        pos += full_form[pos..].chars().next().map_or(1, char::len_utf8);
    }

    result.push_str(&full_form[cursor..]);
    result
}

/// Full form as it should read after `quantity`
pub fn full_form_for_quantity(quantity: &str, full_form: &str) -> String {
    if is_singular(quantity) {
        singularize_tons(full_form)
    } else {
        full_form.to_string()
    }
}
