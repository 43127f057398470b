//! Format validators for government identifiers and plates
//!
//! Format checks only; no registry lookups.

/// CPF: 11 digits, optionally formatted as `000.000.000-00`, with valid
/// check digits. Sequences of a repeated digit are rejected.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || cpf.chars().any(|c| !(c.is_ascii_digit() || c == '.' || c == '-')) {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// CNH: exactly 11 digits
pub fn is_valid_cnh(cnh: &str) -> bool {
    cnh.len() == 11 && cnh.chars().all(|c| c.is_ascii_digit())
}

/// Brazilian plates: legacy `ABC1234` / `ABC-1234` or Mercosul `ABC1D23`
pub fn is_valid_license_plate(plate: &str) -> bool {
    let plate: String = plate.chars().filter(|c| *c != '-').collect();
    let bytes = plate.as_bytes();
    if bytes.len() != 7 {
        return false;
    }
    bytes[..3].iter().all(u8::is_ascii_uppercase)
        && bytes[3].is_ascii_digit()
        && (bytes[4].is_ascii_digit() || bytes[4].is_ascii_uppercase())
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_check_digits() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529 982 247 25"));
    }

    #[test]
    fn cnh_is_eleven_digits() {
        assert!(is_valid_cnh("12345678901"));
        assert!(!is_valid_cnh("1234567890"));
        assert!(!is_valid_cnh("1234567890A"));
    }

    #[test]
    fn plates_legacy_and_mercosul() {
        assert!(is_valid_license_plate("ABC1234"));
        assert!(is_valid_license_plate("ABC-1234"));
        assert!(is_valid_license_plate("BRA2E19"));
        assert!(!is_valid_license_plate("abc1234"));
        assert!(!is_valid_license_plate("AB12345"));
        assert!(!is_valid_license_plate("ABC12345"));
    }
}
