use num_bigint::BigInt;
use rayon::prelude::*;
use std::fmt;

use crate::models::{CufFields, SiatSalesRecord};

/// Hex prefix of the authorization code that carries the packed fields.
const HEX_PREFIX_LEN: usize = 42;
/// Leading digits of the decimal expansion that carry no field data.
const DECIMAL_SKIP: usize = 27;
/// Digits needed after the skip to cover all eight field positions.
const REMAINDER_LEN: usize = 24;

/// Field positions within the 24-digit remainder.
const BRANCH_OFFICE: (usize, usize) = (0, 4);
const MODALITY: (usize, usize) = (4, 5);
const EMISSION_TYPE: (usize, usize) = (5, 6);
const DOCUMENT_TYPE: (usize, usize) = (6, 7);
const SECTOR: (usize, usize) = (7, 9);
const INVOICE_NUMBER: (usize, usize) = (9, 19);
const POINT_OF_SALE: (usize, usize) = (19, 23);
const CHECK_DIGIT: (usize, usize) = (23, 24);

/// Why a single authorization code failed to decode. Never fatal to a batch;
/// the row keeps empty fields and the failure is counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CufDecodeError {
    CodeTooShort(usize),
    InvalidHex,
    DecimalTooShort(usize),
    RemainderTooShort(usize),
}

impl fmt::Display for CufDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeTooShort(len) => write!(f, "code length {len} < {HEX_PREFIX_LEN}"),
            Self::InvalidHex => write!(f, "first {HEX_PREFIX_LEN} characters are not hexadecimal"),
            Self::DecimalTooShort(len) => {
                write!(f, "decimal expansion length {len} <= {DECIMAL_SKIP}")
            }
            Self::RemainderTooShort(len) => {
                write!(f, "remainder length {len} < {REMAINDER_LEN}")
            }
        }
    }
}

/// Decode one authorization code into its packed fields.
///
/// The first 42 hex characters are read as one integer; its decimal expansion,
/// past the first 27 digits, carries the eight fields at fixed positions.
pub fn decode_cuf(code: &str) -> Result<CufFields, CufDecodeError> {
    if code.len() < HEX_PREFIX_LEN {
        return Err(CufDecodeError::CodeTooShort(code.len()));
    }
    // Non-ASCII input cannot be hex; a failed boundary slice falls into the
    // same bucket.
    let hex = code.get(..HEX_PREFIX_LEN).ok_or(CufDecodeError::InvalidHex)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CufDecodeError::InvalidHex);
    }

    // 42 hex digits is 168 bits, beyond u128.
    let value = BigInt::parse_bytes(hex.as_bytes(), 16).ok_or(CufDecodeError::InvalidHex)?;
    let decimal = value.to_str_radix(10);
    if decimal.len() <= DECIMAL_SKIP {
        return Err(CufDecodeError::DecimalTooShort(decimal.len()));
    }

    let remainder = &decimal[DECIMAL_SKIP..];
    if remainder.len() < REMAINDER_LEN {
        return Err(CufDecodeError::RemainderTooShort(remainder.len()));
    }

    Ok(extract_fields(remainder))
}

/// Positional extraction with clipped ranges: a field starting past the end
/// stays empty, a field ending past the end is cut short. Unreachable today
/// (the caller guarantees 24 digits) but kept so a relaxed length check would
/// degrade to empty trailing fields instead of panicking.
fn extract_fields(remainder: &str) -> CufFields {
    let slice = |(start, end): (usize, usize)| -> String {
        if remainder.len() > start {
            remainder[start..end.min(remainder.len())].to_string()
        } else {
            String::new()
        }
    };

    CufFields {
        branch_office: slice(BRANCH_OFFICE),
        modality: slice(MODALITY),
        emission_type: slice(EMISSION_TYPE),
        document_type: slice(DOCUMENT_TYPE),
        sector: slice(SECTOR),
        invoice_number: slice(INVOICE_NUMBER),
        point_of_sale: slice(POINT_OF_SALE),
        check_digit: slice(CHECK_DIGIT),
    }
}

/// Result of one decode pass: the rows (in input order, each with all eight
/// fields present) plus the run counters. Counters are returned by value so
/// repeated passes cannot accumulate stale state.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub rows: Vec<SiatSalesRecord>,
    pub decoded: usize,
    pub failed: usize,
}

/// Decode every row's authorization code. Pure order-preserving mapping;
/// failures leave the row's fields empty and are only counted.
pub fn decode_batch(rows: Vec<SiatSalesRecord>) -> DecodeOutcome {
    let total = rows.len();

    let outcomes: Vec<(SiatSalesRecord, bool)> = rows
        .into_par_iter()
        .map(|mut row| match decode_cuf(&row.authorization_code) {
            Ok(fields) => {
                row.cuf = fields;
                (row, true)
            }
            Err(reason) => {
                tracing::debug!(
                    code = %row.authorization_code,
                    %reason,
                    "authorization code not decodable"
                );
                row.cuf = CufFields::default();
                (row, false)
            }
        })
        .collect();

    let decoded = outcomes.iter().filter(|(_, ok)| *ok).count();
    let rows = outcomes.into_iter().map(|(row, _)| row).collect();
    let failed = total - decoded;

    tracing::info!(total, decoded, failed, "CUF decode pass finished");

    DecodeOutcome { rows, decoded, failed }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 51-digit decimal whose hex expansion is exactly 42 digits. The last 24
    /// digits spell out known field values.
    fn sample_code() -> (String, String) {
        let prefix = "123456789012345678901234567";
        let remainder = format!(
            "{}{}{}{}{}{}{}{}",
            "0002", "2", "1", "1", "01", "0000123456", "0015", "7"
        );
        assert_eq!(remainder.len(), 24);
        let decimal = format!("{prefix}{remainder}");
        let hex = BigInt::parse_bytes(decimal.as_bytes(), 10)
            .unwrap()
            .to_str_radix(16);
        assert_eq!(hex.len(), 42);
        (hex, remainder)
    }

    #[test]
    fn decodes_known_fields() {
        let (hex, _) = sample_code();
        let fields = decode_cuf(&hex).unwrap();
        assert_eq!(fields.branch_office, "0002");
        assert_eq!(fields.modality, "2");
        assert_eq!(fields.emission_type, "1");
        assert_eq!(fields.document_type, "1");
        assert_eq!(fields.sector, "01");
        assert_eq!(fields.invoice_number, "0000123456");
        assert_eq!(fields.point_of_sale, "0015");
        assert_eq!(fields.check_digit, "7");
    }

    #[test]
    fn decode_is_deterministic() {
        let (hex, _) = sample_code();
        assert_eq!(decode_cuf(&hex).unwrap(), decode_cuf(&hex).unwrap());
    }

    #[test]
    fn fields_concatenate_to_remainder() {
        let (hex, remainder) = sample_code();
        let f = decode_cuf(&hex).unwrap();
        let joined = format!(
            "{}{}{}{}{}{}{}{}",
            f.branch_office,
            f.modality,
            f.emission_type,
            f.document_type,
            f.sector,
            f.invoice_number,
            f.point_of_sale,
            f.check_digit
        );
        assert_eq!(joined, remainder);
    }

    #[test]
    fn never_panics_on_garbage() {
        assert_eq!(decode_cuf(""), Err(CufDecodeError::CodeTooShort(0)));
        assert_eq!(
            decode_cuf(&"a".repeat(41)),
            Err(CufDecodeError::CodeTooShort(41))
        );
        assert_eq!(decode_cuf(&"z".repeat(42)), Err(CufDecodeError::InvalidHex));
        assert_eq!(decode_cuf(&"ñ".repeat(42)), Err(CufDecodeError::InvalidHex));
        // 42 zeros: decimal expansion "0" is far too short.
        assert_eq!(
            decode_cuf(&"0".repeat(42)),
            Err(CufDecodeError::DecimalTooShort(1))
        );
        // Small value: expansion longer than 27 digits but remainder under 24.
        let short = BigInt::parse_bytes(b"123456789012345678901234567890", 10)
            .unwrap()
            .to_str_radix(16);
        let padded = format!("{:0>42}", short);
        assert_eq!(
            decode_cuf(&padded),
            Err(CufDecodeError::RemainderTooShort(3))
        );
    }

    #[test]
    fn batch_counts_and_defaults() {
        let (hex, _) = sample_code();
        let rows = vec![
            SiatSalesRecord {
                authorization_code: hex,
                ..Default::default()
            },
            SiatSalesRecord {
                authorization_code: "not-a-cuf".to_string(),
                ..Default::default()
            },
        ];
        let outcome = decode_batch(rows);
        assert_eq!(outcome.decoded, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.rows.len(), 2);
        assert!(outcome.rows[0].cuf.is_decoded());
        assert_eq!(outcome.rows[1].cuf, CufFields::default());
    }
}
