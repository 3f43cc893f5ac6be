//! Proxy line validation.
//!
//! A well-formed record is `A.B.C.D:PORT` where each octet is one to three
//! decimal digits with a value in `0..=255`, and the port is a decimal integer
//! in `1..=65535` written without a leading zero. Anything else, including
//! surrounding garbage or extra separators, is rejected.

use twinsync_types::ValidationResult;

/// Lines kept after filtering fetched content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredLines {
    /// Valid lines, trimmed, in input order.
    pub kept: Vec<String>,
    /// Number of non-empty lines examined.
    pub total: usize,
}

impl FilteredLines {
    /// Join the kept lines into proxy list text.
    pub fn joined(&self) -> String {
        self.kept.join("\n")
    }
}

/// Check whether a single (already trimmed) line is a valid `address:port` record.
pub fn is_valid_line(line: &str) -> bool {
    let Some((address, port)) = line.split_once(':') else {
        return false;
    };
    is_valid_address(address) && is_valid_port(port)
}

/// Validate proxy list text as entered by the operator.
///
/// Empty text is vacuously valid.
pub fn validate(text: &str) -> ValidationResult {
    let mut total_lines = 0;
    let mut invalid_lines = Vec::new();

    for line in non_empty_lines(text) {
        total_lines += 1;
        if !is_valid_line(line) {
            invalid_lines.push(line.to_string());
        }
    }

    ValidationResult {
        is_valid: invalid_lines.is_empty(),
        invalid_lines,
        total_lines,
    }
}

/// Keep only the valid lines of fetched content, dropping the rest silently.
pub fn filter_valid(text: &str) -> FilteredLines {
    let mut filtered = FilteredLines::default();
    for line in non_empty_lines(text) {
        filtered.total += 1;
        if is_valid_line(line) {
            filtered.kept.push(line.to_string());
        }
    }
    filtered
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn is_valid_address(address: &str) -> bool {
    let mut octets = 0;
    for part in address.split('.') {
        octets += 1;
        if octets > 4 || !is_valid_octet(part) {
            return false;
        }
    }
    octets == 4
}

fn is_valid_octet(part: &str) -> bool {
    if part.is_empty() || part.len() > 3 || !all_digits(part) {
        return false;
    }
    part.parse::<u16>().map_or(false, |value| value <= 255)
}

fn is_valid_port(port: &str) -> bool {
    if port.is_empty() || port.len() > 5 || !all_digits(port) || port.starts_with('0') {
        return false;
    }
    port.parse::<u32>()
        .map_or(false, |value| (1..=65_535).contains(&value))
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
