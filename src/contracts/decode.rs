//! Sequential readers over decoded ABI tokens.

use super::ContractError;
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};

/// Reads decoded output fields in declaration order.
pub struct Fields {
    method: String,
    position: usize,
    tokens: std::vec::IntoIter<Token>,
}

impl Fields {
    pub fn new(method: &str, tokens: Vec<Token>) -> Self {
        Self {
            method: method.to_string(),
            position: 0,
            tokens: tokens.into_iter(),
        }
    }

    /// Fields of a struct return value.
    ///
    /// Accepts both a single tuple token (`getX() returns (Struct)`) and the
    /// flattened form produced by public mapping getters.
    pub fn from_struct(method: &str, mut tokens: Vec<Token>) -> Self {
        if matches!(tokens.as_slice(), [Token::Tuple(_)]) {
            if let Some(Token::Tuple(inner)) = tokens.pop() {
                return Self::new(method, inner);
            }
        }
        Self::new(method, tokens)
    }

    fn next(&mut self) -> Result<Token, ContractError> {
        self.position += 1;
        self.tokens.next().ok_or_else(|| {
            ContractError::decode(&self.method, format!("missing output field {}", self.position))
        })
    }

    fn mismatch(&self, expected: &str, got: &Token) -> ContractError {
        ContractError::decode(
            &self.method,
            format!("field {} expected {}, got {:?}", self.position, expected, got),
        )
    }

    pub fn uint(&mut self) -> Result<U256, ContractError> {
        match self.next()? {
            Token::Uint(v) => Ok(v),
            other => Err(self.mismatch("uint", &other)),
        }
    }

    pub fn u64(&mut self) -> Result<u64, ContractError> {
        let value = self.uint()?;
        if value > U256::from(u64::MAX) {
            return Err(self.mismatch("uint64", &Token::Uint(value)));
        }
        Ok(value.as_u64())
    }

    pub fn u32(&mut self) -> Result<u32, ContractError> {
        let value = self.u64()?;
        u32::try_from(value).map_err(|_| self.mismatch("uint32", &Token::Uint(value.into())))
    }

    pub fn u16(&mut self) -> Result<u16, ContractError> {
        let value = self.u64()?;
        u16::try_from(value).map_err(|_| self.mismatch("uint16", &Token::Uint(value.into())))
    }

    pub fn u8(&mut self) -> Result<u8, ContractError> {
        let value = self.u64()?;
        u8::try_from(value).map_err(|_| self.mismatch("uint8", &Token::Uint(value.into())))
    }

    pub fn address(&mut self) -> Result<Address, ContractError> {
        match self.next()? {
            Token::Address(a) => Ok(a),
            other => Err(self.mismatch("address", &other)),
        }
    }

    pub fn bool(&mut self) -> Result<bool, ContractError> {
        match self.next()? {
            Token::Bool(b) => Ok(b),
            other => Err(self.mismatch("bool", &other)),
        }
    }

    pub fn string(&mut self) -> Result<String, ContractError> {
        match self.next()? {
            Token::String(s) => Ok(s),
            other => Err(self.mismatch("string", &other)),
        }
    }

    fn array(&mut self) -> Result<Vec<Token>, ContractError> {
        match self.next()? {
            Token::Array(items) | Token::FixedArray(items) => Ok(items),
            other => Err(self.mismatch("array", &other)),
        }
    }

    pub fn addresses(&mut self) -> Result<Vec<Address>, ContractError> {
        let items = self.array()?;
        items
            .into_iter()
            .map(|t| match t {
                Token::Address(a) => Ok(a),
                other => Err(self.mismatch("address[]", &other)),
            })
            .collect()
    }

    pub fn u16s(&mut self) -> Result<Vec<u16>, ContractError> {
        let items = self.array()?;
        items
            .into_iter()
            .map(|t| match t {
                Token::Uint(v) if v <= U256::from(u16::MAX) => Ok(v.as_u32() as u16),
                other => Err(self.mismatch("uint16[]", &other)),
            })
            .collect()
    }

    /// Nested struct field.
    pub fn tuple(&mut self) -> Result<Fields, ContractError> {
        match self.next()? {
            Token::Tuple(inner) => Ok(Fields::new(&self.method, inner)),
            other => Err(self.mismatch("tuple", &other)),
        }
    }
}

/// First output as a uint.
pub fn single_uint(method: &str, tokens: Vec<Token>) -> Result<U256, ContractError> {
    Fields::new(method, tokens).uint()
}

pub fn single_address(method: &str, tokens: Vec<Token>) -> Result<Address, ContractError> {
    Fields::new(method, tokens).address()
}

pub fn single_bool(method: &str, tokens: Vec<Token>) -> Result<bool, ContractError> {
    Fields::new(method, tokens).bool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_struct_unwraps_tuple() {
        let tokens = vec![Token::Tuple(vec![
            Token::Uint(7u64.into()),
            Token::Bool(true),
        ])];
        let mut fields = Fields::from_struct("getThing", tokens);
        assert_eq!(fields.u16().unwrap(), 7);
        assert!(fields.bool().unwrap());
        assert!(fields.bool().is_err());
    }

    #[test]
    fn test_from_struct_flat() {
        let tokens = vec![Token::Uint(1u64.into()), Token::Address(Address::zero())];
        let mut fields = Fields::from_struct("things", tokens);
        assert_eq!(fields.u64().unwrap(), 1);
        assert_eq!(fields.address().unwrap(), Address::zero());
    }

    #[test]
    fn test_type_mismatch_reports_field() {
        let mut fields = Fields::new("getX", vec![Token::Bool(false)]);
        let err = fields.uint().unwrap_err();
        assert!(err.to_string().contains("field 1 expected uint"));
    }

    #[test]
    fn test_narrowing_overflow() {
        let mut fields = Fields::new("getX", vec![Token::Uint(70_000u64.into())]);
        assert!(fields.u16().is_err());
    }
}
