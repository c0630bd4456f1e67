/// GU code extraction.
///
/// Registry labels and UMM unit names are free text ("Moneypoint GU_400850",
/// "gu_400850 MP1"). Both sides are reduced to the first `GU_<digits>` token,
/// upper-cased, so matching is plain string equality. Registry loading and
/// message matching must both go through `extract_unit_code`.

const PREFIX: &str = "GU_";

/// Returns the first `GU_` + one-or-more-digits token in `text`, upper-cased.
///
/// Returns `None` for empty text or when no such token exists.
pub fn extract_unit_code(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let upper = text.to_uppercase();
    let mut rest = upper.as_str();

    while let Some(pos) = rest.find(PREFIX) {
        let after = &rest[pos + PREFIX.len()..];
        let digits = after
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if digits > 0 {
            return Some(format!("{}{}", PREFIX, &after[..digits]));
        }

        rest = after;
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
