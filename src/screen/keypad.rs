//! Numeric keypad encoding.

/// Keys to tap on a numeric keypad to enter `value`.
///
/// The keypad has a double-zero key. Pairs of zeros are entered with it; a
/// zero that cannot be paired is entered on its own, either just before the
/// next non-zero digit or as the final digit.
pub fn keypad_taps(value: u64) -> Vec<String> {
    let digits = value.to_string();
    let last = digits.len() - 1;
    let mut taps = Vec::new();
    let mut pending_zero = false;

    for (index, digit) in digits.chars().enumerate() {
        if digit == '0' {
            if pending_zero {
                taps.push("00".to_string());
                pending_zero = false;
            } else if index == last {
                taps.push("0".to_string());
            } else {
                pending_zero = true;
            }
            continue;
        }
        if pending_zero {
            taps.push("0".to_string());
            pending_zero = false;
        }
        taps.push(digit.to_string());
    }

    taps
}
