//! Generators behind `{{fake.<kind>}}` placeholders

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::common::{Error, Result};

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Eduarda", "Felipe", "Gabriela", "Henrique", "Isabela",
    "João", "Larissa", "Marcos", "Natália", "Otávio", "Paula", "Rafael", "Sofia", "Thiago",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Barbosa", "Carvalho", "Costa", "Ferreira", "Gomes", "Lima", "Martins",
    "Oliveira", "Pereira", "Ribeiro", "Rocha", "Santos", "Silva", "Souza",
];

const COMPANY_SUFFIXES: &[&str] = &["e Filhos", "LTDA", "S.A.", "Comércio", "Atacadista", "& Cia"];

const STREET_PREFIXES: &[&str] = &["Rua", "Avenida", "Travessa", "Alameda", "Praça"];

const PRODUCE: &[&str] = &[
    "Maçã", "Banana", "Laranja", "Manga", "Abacaxi", "Uva", "Pera", "Mamão", "Goiaba", "Melancia",
];

const PRODUCE_QUALIFIERS: &[&str] = &["Fuji", "Prata", "Pera", "Palmer", "Pérola", "Itália", "Orgânica", "Formosa"];

/// Kinds accepted after `fake.`
pub const KINDS: &[&str] = &["cnpj", "company", "street", "person", "product", "price", "quantity"];

/// Generate one fake value of the given kind
pub fn generate<R: Rng>(kind: &str, rng: &mut R) -> Result<Value> {
    let value = match kind {
        "cnpj" => Value::String(cnpj(rng)),
        "company" => Value::String(format!("{} {}", pick(LAST_NAMES, rng), pick(COMPANY_SUFFIXES, rng))),
        "street" => Value::String(format!(
            "{} {} {}, {}",
            pick(STREET_PREFIXES, rng),
            pick(FIRST_NAMES, rng),
            pick(LAST_NAMES, rng),
            rng.gen_range(1..=9999)
        )),
        "person" => Value::String(format!("{} {}", pick(FIRST_NAMES, rng), pick(LAST_NAMES, rng))),
        "product" => Value::String(format!("{} {}", pick(PRODUCE, rng), pick(PRODUCE_QUALIFIERS, rng))),
        "price" => {
            let cents: u32 = rng.gen_range(100..=100_000);
            Value::String(format!("{}.{:02}", cents / 100, cents % 100))
        }
        "quantity" => Value::from(rng.gen_range(1..=100u32)),
        other => {
            return Err(Error::Template(format!(
                "Unknown fake kind '{}'. Supported: {}",
                other,
                KINDS.join(", ")
            )))
        }
    };
    Ok(value)
}

fn pick<'a, R: Rng>(items: &[&'a str], rng: &mut R) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Fourteen digits with valid CNPJ check digits
pub fn cnpj<R: Rng>(rng: &mut R) -> String {
    let mut digits: Vec<u32> = (0..12).map(|_| rng.gen_range(0..10)).collect();
    // Repeated-digit bases pass the checksum but are rejected as invalid
    if digits.iter().all(|d| *d == digits[0]) {
        digits[11] = (digits[0] + 1) % 10;
    }
    let first = check_digit(&digits, &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    digits.push(first);
    let second = check_digit(&digits, &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    digits.push(second);
    digits.iter().map(|d| char::from_digit(*d, 10).unwrap_or('0')).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

/// Whether a string carries valid CNPJ check digits
pub fn is_valid_cnpj(value: &str) -> bool {
    let digits: Vec<u32> = match value.chars().map(|c| c.to_digit(10)).collect::<Option<Vec<_>>>() {
        Some(d) if d.len() == 14 => d,
        _ => return false,
    };
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]) == digits[12]
        && check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]) == digits[13]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cnpj_is_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let value = cnpj(&mut rng);
            assert_eq!(value.len(), 14);
            assert!(is_valid_cnpj(&value), "{} should be valid", value);
        }
    }

    #[test]
    fn test_known_cnpj() {
        assert!(is_valid_cnpj("11222333000181"));
        assert!(!is_valid_cnpj("11222333000182"));
        assert!(!is_valid_cnpj("123"));
        assert!(!is_valid_cnpj("00000000000000"));
    }

    #[test]
    fn test_price_and_quantity_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let price = generate("price", &mut rng).unwrap();
        let text = price.as_str().unwrap();
        let (whole, cents) = text.split_once('.').unwrap();
        assert!(whole.parse::<u32>().is_ok());
        assert_eq!(cents.len(), 2);

        let qty = generate("quantity", &mut rng).unwrap().as_u64().unwrap();
        assert!((1..=100).contains(&qty));
    }

    #[test]
    fn test_unknown_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(generate("iban", &mut rng), Err(Error::Template(_))));
    }

    #[test]
    fn test_every_listed_kind_generates() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in KINDS {
            let value = generate(kind, &mut rng).unwrap();
            assert!(!value.is_null());
        }
    }
}
