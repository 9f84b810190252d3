//! Typed parsing of command line arguments against ABI parameter types, and
//! display formatting of decoded tokens.
//!
//! Arguments are comma separated. Arrays use `[a,b]`, tuples `(a,b)`, and
//! strings containing commas may be double quoted. Every value must be a
//! literal of the declared type; nothing is evaluated.

use super::ContractError;
use crate::utils::address::{checksum, parse_address};
use ethers_core::abi::{Function, ParamType, Token};
use ethers_core::types::{I256, U256};

/// Parse `raw` into tokens matching `function`'s inputs.
pub fn parse_call_args(function: &Function, raw: Option<&str>) -> Result<Vec<Token>, ContractError> {
    let values = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => split_top_level(raw)?,
        None => Vec::new(),
    };
    if values.len() != function.inputs.len() {
        return Err(ContractError::InvalidArgument(format!(
            "{} expects {} argument(s) ({}), got {}",
            function.name,
            function.inputs.len(),
            function
                .inputs
                .iter()
                .map(|p| p.kind.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            values.len()
        )));
    }
    function
        .inputs
        .iter()
        .zip(values.iter())
        .map(|(param, value)| parse_token(&param.kind, value))
        .collect()
}

/// Parse a single literal of type `kind`.
pub fn parse_token(kind: &ParamType, raw: &str) -> Result<Token, ContractError> {
    let value = raw.trim();
    let invalid = || ContractError::InvalidArgument(format!("'{}' is not a valid {}", value, kind));

    match kind {
        ParamType::Address => parse_address(unquote(value))
            .map(Token::Address)
            .map_err(|_| invalid()),
        ParamType::Uint(bits) => {
            let parsed = parse_uint(value).ok_or_else(invalid)?;
            if *bits < 256 && parsed.bits() > *bits {
                return Err(invalid());
            }
            Ok(Token::Uint(parsed))
        }
        ParamType::Int(bits) => {
            let parsed = I256::from_dec_str(value).map_err(|_| invalid())?;
            if !fits_signed(parsed, *bits) {
                return Err(invalid());
            }
            Ok(Token::Int(parsed.into_raw()))
        }
        ParamType::Bool => match value.to_ascii_lowercase().as_str() {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            _ => Err(invalid()),
        },
        ParamType::String => Ok(Token::String(unquote(value).to_string())),
        ParamType::Bytes => parse_hex(value).map(Token::Bytes).ok_or_else(invalid),
        ParamType::FixedBytes(len) => {
            let bytes = parse_hex(value).ok_or_else(invalid)?;
            if bytes.len() != *len {
                return Err(invalid());
            }
            Ok(Token::FixedBytes(bytes))
        }
        ParamType::Array(inner) => {
            let items = split_top_level(strip_delimiters(value, '[', ']').ok_or_else(invalid)?)?;
            items
                .iter()
                .map(|item| parse_token(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array)
        }
        ParamType::FixedArray(inner, len) => {
            let items = split_top_level(strip_delimiters(value, '[', ']').ok_or_else(invalid)?)?;
            if items.len() != *len {
                return Err(invalid());
            }
            items
                .iter()
                .map(|item| parse_token(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::FixedArray)
        }
        ParamType::Tuple(kinds) => {
            let body = strip_delimiters(value, '(', ')')
                .or_else(|| strip_delimiters(value, '[', ']'))
                .ok_or_else(invalid)?;
            let items = split_top_level(body)?;
            if items.len() != kinds.len() {
                return Err(invalid());
            }
            kinds
                .iter()
                .zip(items.iter())
                .map(|(k, item)| parse_token(k, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple)
        }
    }
}

/// `value` lies in `[-2^(bits-1), 2^(bits-1) - 1]`.
fn fits_signed(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let limit = U256::one() << bits.saturating_sub(1);
    let magnitude = value.unsigned_abs();
    if value.is_negative() {
        magnitude <= limit
    } else {
        magnitude < limit
    }
}

/// Split on commas that are not nested in brackets, parentheses or quotes.
pub fn split_top_level(raw: &str) -> Result<Vec<String>, ContractError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;

    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' | '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if !in_quotes => {
                depth -= 1;
                if depth < 0 {
                    return Err(ContractError::InvalidArgument(format!(
                        "unbalanced brackets in '{}'",
                        raw
                    )));
                }
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if depth != 0 || in_quotes {
        return Err(ContractError::InvalidArgument(format!(
            "unbalanced brackets or quotes in '{}'",
            raw
        )));
    }
    let last = current.trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last.to_string());
    }
    Ok(parts)
}

fn strip_delimiters(value: &str, open: char, close: char) -> Option<&str> {
    value.strip_prefix(open)?.strip_suffix(close).map(str::trim)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_uint(value: &str) -> Option<U256> {
    if let Some(hex) = value.strip_prefix("0x") {
        if hex.is_empty() {
            return None;
        }
        return U256::from_str_radix(hex, 16).ok();
    }
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(value).ok()
}

fn parse_hex(value: &str) -> Option<Vec<u8>> {
    hex::decode(value.strip_prefix("0x")?).ok()
}

/// Render a decoded token for display.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Address(a) => checksum(a),
        Token::Uint(v) => v.to_string(),
        Token::Int(v) => I256::from_raw(*v).to_string(),
        Token::Bool(b) => b.to_string(),
        Token::String(s) => s.clone(),
        Token::Bytes(b) | Token::FixedBytes(b) => format!("0x{}", hex::encode(b)),
        Token::Array(items) | Token::FixedArray(items) => format!(
            "[{}]",
            items.iter().map(format_token).collect::<Vec<_>>().join(", ")
        ),
        Token::Tuple(items) => format!(
            "({})",
            items.iter().map(format_token).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Render all outputs of a call; a single output is shown bare.
pub fn format_outputs(tokens: &[Token]) -> String {
    match tokens {
        [] => "()".to_string(),
        [single] => format_token(single),
        many => format!(
            "({})",
            many.iter().map(format_token).collect::<Vec<_>>().join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::{Param, StateMutability};
    use ethers_core::types::Address;

    #[allow(deprecated)]
    fn function(inputs: Vec<ParamType>) -> Function {
        Function {
            name: "target".to_string(),
            inputs: inputs
                .into_iter()
                .enumerate()
                .map(|(i, kind)| Param {
                    name: format!("arg{}", i),
                    kind,
                    internal_type: None,
                })
                .collect(),
            outputs: vec![],
            constant: None,
            state_mutability: StateMutability::NonPayable,
        }
    }

    #[test]
    fn test_parse_scalar_args() {
        let f = function(vec![
            ParamType::Uint(16),
            ParamType::Address,
            ParamType::Bool,
            ParamType::String,
        ]);
        let tokens = parse_call_args(
            &f,
            Some("3, 0xBC45C2511eA43F998E659b4722D6795C482a7E07, true, \"hello, world\""),
        )
        .unwrap();
        assert_eq!(tokens[0], Token::Uint(3u64.into()));
        assert!(matches!(tokens[1], Token::Address(_)));
        assert_eq!(tokens[2], Token::Bool(true));
        assert_eq!(tokens[3], Token::String("hello, world".to_string()));
    }

    #[test]
    fn test_parse_nested() {
        let f = function(vec![
            ParamType::Uint(16),
            ParamType::Array(Box::new(ParamType::Tuple(vec![
                ParamType::Address,
                ParamType::Uint(256),
            ]))),
        ]);
        let tokens = parse_call_args(
            &f,
            Some("1,[(0x0000000000000000000000000000000000000001,500000),(0x0000000000000000000000000000000000000002,500000)]"),
        )
        .unwrap();
        match &tokens[1] {
            Token::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_expressions() {
        let f = function(vec![ParamType::Uint(256)]);
        assert!(parse_call_args(&f, Some("__import__('os')")).is_err());
        assert!(parse_call_args(&f, Some("1+1")).is_err());
        assert!(parse_call_args(&f, Some("-1")).is_err());
    }

    #[test]
    fn test_uint_width_checked() {
        let f = function(vec![ParamType::Uint(8)]);
        assert!(parse_call_args(&f, Some("255")).is_ok());
        assert!(parse_call_args(&f, Some("256")).is_err());
    }

    #[test]
    fn test_int_width_checked() {
        let f = function(vec![ParamType::Int(8)]);
        assert!(parse_call_args(&f, Some("127")).is_ok());
        assert!(parse_call_args(&f, Some("-128")).is_ok());
        assert!(parse_call_args(&f, Some("128")).is_err());
        assert!(parse_call_args(&f, Some("-129")).is_err());
        assert!(parse_call_args(&f, Some("1000")).is_err());

        let wide = function(vec![ParamType::Int(256)]);
        assert!(parse_call_args(&wide, Some("-1000")).is_ok());
    }

    #[test]
    fn test_arg_count_mismatch() {
        let f = function(vec![ParamType::Uint(16), ParamType::Address]);
        let err = parse_call_args(&f, Some("1")).unwrap_err();
        assert!(err.to_string().contains("expects 2 argument(s)"));
        assert!(parse_call_args(&function(vec![]), None).unwrap().is_empty());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a,[b,c],(d,e)").unwrap(),
            vec!["a", "[b,c]", "(d,e)"]
        );
        assert!(split_top_level("[a,b").is_err());
        assert!(split_top_level("").unwrap().is_empty());
    }

    #[test]
    fn test_format_tokens() {
        let tokens = vec![
            Token::Uint(42u64.into()),
            Token::Array(vec![Token::Address(Address::zero())]),
            Token::Bool(false),
        ];
        assert_eq!(
            format_outputs(&tokens),
            "(42, [0x0000000000000000000000000000000000000000], false)"
        );
        assert_eq!(format_outputs(&tokens[..1]), "42");
        assert_eq!(format_token(&Token::Int(I256::from_dec_str("-5").unwrap().into_raw())), "-5");
    }
}
