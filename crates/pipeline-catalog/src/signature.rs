//! Method signature parsing
//!
//! Node types document their methods with signature lines of the form
//! `V.SetRadius(float)` or `V.GetCenter() -> (float, float, float)`.
//! This module extracts those lines from a documentation string and infers
//! the return type and argument types of each overload.
//!
//! Parsing never fails: a side of the signature that cannot be interpreted
//! becomes [`SigType::Error`], and a missing arrow means a `Void` return.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::types::ScalarType;

/// A type appearing in a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigType {
    Int,
    Float,
    String,
    Bool,
    /// No value (no arguments, or no return value)
    Void,
    /// The signature text could not be interpreted
    Error,
    /// Several values, e.g. `(float, float, float)`
    Tuple(Vec<SigType>),
}

impl SigType {
    /// The scalar attribute type this maps to, if it is int, float or string
    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            SigType::Int => Some(ScalarType::Int),
            SigType::Float => Some(ScalarType::Float),
            SigType::String => Some(ScalarType::String),
            _ => None,
        }
    }

    /// Number of values this type stands for
    pub fn arity(&self) -> usize {
        match self {
            SigType::Void | SigType::Error => 0,
            SigType::Tuple(items) => items.len(),
            _ => 1,
        }
    }
}

impl std::fmt::Display for SigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigType::Int => write!(f, "int"),
            SigType::Float => write!(f, "float"),
            SigType::String => write!(f, "string"),
            SigType::Bool => write!(f, "bool"),
            SigType::Void => write!(f, "void"),
            SigType::Error => write!(f, "error"),
            SigType::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Inferred return and argument types of one overload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    pub return_type: SigType,
    pub arg_types: SigType,
}

impl MethodSignature {
    /// Fail when either side of the signature could not be interpreted
    pub fn check(&self, method: &str) -> Result<()> {
        if self.return_type == SigType::Error || self.arg_types == SigType::Error {
            return Err(CatalogError::SignatureUnparseable(format!(
                "{}: {} -> {}",
                method, self.arg_types, self.return_type
            )));
        }
        Ok(())
    }
}

/// Extract every signature line for `method` from a documentation string
///
/// Dunder-style names (`__init__`) never yield signatures.
pub fn extract_signatures(doc: &str, method: &str) -> Vec<String> {
    if method.starts_with("__") && method.ends_with("__") && method.len() > 4 {
        return Vec::new();
    }

    let pattern = format!(
        r"[A-Za-z_]\w*\.{}\([\w \t\[\]\(\)\.,]*\)(?:\s->\s)*[-\w\(\)\[\], \t]*",
        regex::escape(method)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            log::debug!("Signature pattern for '{}' failed to compile: {}", method, e);
            return Vec::new();
        }
    };

    re.find_iter(doc)
        .map(|m| m.as_str().trim_end().to_string())
        .collect()
}

/// Parse a single signature line
pub fn parse_signature(signature: &str, method: &str) -> MethodSignature {
    let compact: String = signature.chars().filter(|c| !c.is_whitespace()).collect();

    let (call, ret) = match compact.split_once("->") {
        Some((call, ret)) if !ret.is_empty() => (call, Some(ret)),
        Some((call, _)) => (call, None),
        None => (compact.as_str(), None),
    };

    let return_type = match ret {
        Some(ret) => parse_type_expr(ret).unwrap_or(SigType::Error),
        None => SigType::Void,
    };

    MethodSignature {
        return_type,
        arg_types: parse_args(call, method),
    }
}

/// Extract and parse every overload of `method` documented in `doc`
pub fn infer_types(doc: Option<&str>, method: &str) -> Vec<MethodSignature> {
    let Some(doc) = doc else {
        return Vec::new();
    };
    extract_signatures(doc, method)
        .iter()
        .map(|sig| parse_signature(sig, method))
        .collect()
}

fn parse_args(call: &str, method: &str) -> SigType {
    let Some(open) = call.find('(') else {
        return SigType::Error;
    };
    let head = &call[..open];
    let receiver_ok = head
        .strip_suffix(method)
        .and_then(|r| r.strip_suffix('.'))
        .is_some_and(|r| !r.is_empty());
    if !receiver_ok || !call.ends_with(')') {
        return SigType::Error;
    }

    let inner = &call[open + 1..call.len() - 1];
    if inner.is_empty() {
        return SigType::Void;
    }
    parse_type_expr(inner).unwrap_or(SigType::Error)
}

/// Parse a type expression such as `float`, `int, int` or `(float, [int, int])`
fn parse_type_expr(text: &str) -> Option<SigType> {
    let mut parser = TypeParser {
        chars: text.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };
    let ty = parser.sequence(None)?;
    if parser.pos == parser.chars.len() {
        Some(ty)
    } else {
        None
    }
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Comma separated items up to `close` (or end of input)
    ///
    /// A single item without a trailing comma stands for itself, matching
    /// how a parenthesized expression evaluates.
    fn sequence(&mut self, close: Option<char>) -> Option<SigType> {
        let mut items = Vec::new();
        let mut trailing_comma = false;

        while self.peek().is_some() && self.peek() != close {
            items.push(self.item()?);
            trailing_comma = false;
            if self.peek() == Some(',') {
                self.pos += 1;
                trailing_comma = true;
            } else {
                break;
            }
        }

        if items.len() == 1 && !trailing_comma {
            items.pop()
        } else {
            Some(SigType::Tuple(items))
        }
    }

    fn item(&mut self) -> Option<SigType> {
        match self.peek()? {
            '(' => {
                self.pos += 1;
                let inner = self.sequence(Some(')'))?;
                self.expect(')')?;
                Some(inner)
            }
            '[' => {
                self.pos += 1;
                let inner = self.sequence(Some(']'))?;
                self.expect(']')?;
                Some(match inner {
                    SigType::Tuple(items) => SigType::Tuple(items),
                    single => SigType::Tuple(vec![single]),
                })
            }
            _ => self.name(),
        }
    }

    fn name(&mut self) -> Option<SigType> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "int" => Some(SigType::Int),
            "float" => Some(SigType::Float),
            "str" | "string" => Some(SigType::String),
            "bool" => Some(SigType::Bool),
            "None" => Some(SigType::Void),
            _ => None,
        }
    }

    fn expect(&mut self, c: char) -> Option<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_signature() {
        let sig = parse_signature("V.GetRadius() -> float", "GetRadius");
        assert_eq!(sig.return_type, SigType::Float);
        assert_eq!(sig.arg_types, SigType::Void);
    }

    #[test]
    fn test_setter_without_arrow_returns_void() {
        let sig = parse_signature("V.SetRadius(float)", "SetRadius");
        assert_eq!(sig.return_type, SigType::Void);
        assert_eq!(sig.arg_types, SigType::Float);

        let sig = parse_signature("V.SetFileName(string)", "SetFileName");
        assert_eq!(sig.arg_types, SigType::String);
    }

    #[test]
    fn test_tuple_arguments() {
        let sig = parse_signature("V.SetCenter(float, float, float)", "SetCenter");
        assert_eq!(
            sig.arg_types,
            SigType::Tuple(vec![SigType::Float, SigType::Float, SigType::Float])
        );

        let sig = parse_signature("V.SetCenter((float, float, float))", "SetCenter");
        assert_eq!(sig.arg_types.arity(), 3);

        let sig = parse_signature("V.SetExtent([int, int])", "SetExtent");
        assert_eq!(sig.arg_types, SigType::Tuple(vec![SigType::Int, SigType::Int]));

        let sig = parse_signature("V.GetCenter() -> (float, float, float)", "GetCenter");
        assert_eq!(sig.return_type.arity(), 3);
    }

    #[test]
    fn test_unknown_types_are_errors() {
        let sig = parse_signature("V.SetInputData(vtkDataObject)", "SetInputData");
        assert_eq!(sig.arg_types, SigType::Error);

        let sig = parse_signature("V.GetOutput() -> vtkPolyData", "GetOutput");
        assert_eq!(sig.return_type, SigType::Error);
        assert_eq!(sig.arg_types, SigType::Void);
    }

    #[test]
    fn test_check_reports_unparseable_side() {
        let sig = parse_signature("V.SetInputData(vtkDataObject)", "SetInputData");
        assert!(matches!(
            sig.check("SetInputData"),
            Err(CatalogError::SignatureUnparseable(_))
        ));
        assert!(parse_signature("V.SetRadius(float)", "SetRadius")
            .check("SetRadius")
            .is_ok());
    }

    #[test]
    fn test_empty_return_after_arrow() {
        let sig = parse_signature("V.Update() ->", "Update");
        assert_eq!(sig.return_type, SigType::Void);
        assert_eq!(sig.arg_types, SigType::Void);
    }

    #[test]
    fn test_receiver_must_match_method() {
        let sig = parse_signature("V.SetOther(int)", "SetRadius");
        assert_eq!(sig.arg_types, SigType::Error);
    }

    #[test]
    fn test_extract_multiple_overloads() {
        let doc = "V.SetCenter(float, float, float)\n\
                   C++: void SetCenter(double, double, double)\n\
                   V.SetCenter((float, float, float))\n\
                   C++: void SetCenter(double a[3])";
        let sigs = extract_signatures(doc, "SetCenter");
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0], "V.SetCenter(float, float, float)");

        let types = infer_types(Some(doc), "SetCenter");
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].arg_types.arity(), 3);
    }

    #[test]
    fn test_extract_getter_with_return() {
        let doc = "V.GetResolution() -> int\nC++: virtual int GetResolution()";
        let types = infer_types(Some(doc), "GetResolution");
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].return_type, SigType::Int);
        assert_eq!(types[0].arg_types, SigType::Void);
    }

    #[test]
    fn test_dunder_and_missing_docs() {
        assert!(extract_signatures("x.__init__()", "__init__").is_empty());
        assert!(infer_types(None, "GetRadius").is_empty());
        assert!(infer_types(Some("no signatures here"), "GetRadius").is_empty());
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(SigType::Int.as_scalar(), Some(ScalarType::Int));
        assert_eq!(SigType::String.as_scalar(), Some(ScalarType::String));
        assert_eq!(SigType::Bool.as_scalar(), None);
        assert_eq!(SigType::Tuple(vec![SigType::Float]).as_scalar(), None);
    }
}
