//! JavaScript value representation
//!
//! The core `JsValue` type, interned property keys and the primitive
//! conversions (ToBoolean, ToNumber, ToString, ToInt32, ToUint32) that every
//! operator builds on. Conversions that may call back into script code
//! (ToPrimitive on objects) live on the evaluator.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHasher;

use crate::object::ObjectRef;

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit at call sites that a clone only bumps a reference count.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(ObjectRef),
}

impl CheapClone for JsValue {}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    /// Check if this value is callable (a function)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => obj.is_callable(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) => {
                if obj.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// ToNumber for primitives. Objects yield NaN here; use
    /// `Evaluator::to_number` to run ToPrimitive first.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// ToString for primitives. Objects render as `[object <Class>]`; use
    /// `Evaluator::to_string` to honour a script-defined `toString`.
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(obj) => JsString::from(format!("[object {}]", obj.class_name())),
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            // IEEE-754: NaN != NaN, +0 == -0
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

/// Identity comparison of two object handles.
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Object(obj) => write!(f, "[object {}]", obj.class_name()),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<u32> for JsValue {
    fn from(n: u32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<ObjectRef> for JsValue {
    fn from(obj: ObjectRef) -> Self {
        JsValue::Object(obj)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in UTF-16 code units, the unit the language measures strings in.
    pub fn utf16_len(&self) -> usize {
        self.0.encode_utf16().count()
    }

    pub fn to_utf16(&self) -> Vec<u16> {
        self.0.encode_utf16().collect()
    }

    pub fn from_utf16(units: &[u16]) -> Self {
        JsString::from(String::from_utf16_lossy(units))
    }

    pub fn concat(&self, other: &str) -> JsString {
        let mut s = String::with_capacity(self.0.len() + other.len());
        s.push_str(&self.0);
        s.push_str(other);
        JsString::from(s)
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A property name together with its precomputed hash.
///
/// Keys are hashed once when they are created (by the parser for identifiers
/// and static member names, or when a computed name is converted), so scope
/// and property lookups never rehash the string.
#[derive(Clone)]
pub struct PropertyKey {
    name: JsString,
    hash: u64,
}

impl CheapClone for PropertyKey {}

impl PropertyKey {
    pub fn new(name: JsString) -> Self {
        let mut hasher = FxHasher::default();
        name.as_str().hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            name,
        }
    }

    pub fn name(&self) -> &JsString {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    /// The array index this key denotes, if it is a canonical one.
    pub fn as_index(&self) -> Option<u32> {
        let s = self.name.as_str();
        let first = s.bytes().next()?;
        if !first.is_ascii_digit() || (first == b'0' && s.len() > 1) {
            return None;
        }
        match s.parse::<u32>() {
            Ok(idx) if idx != u32::MAX => Some(idx),
            _ => None,
        }
    }
}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.name == other.name
    }
}

impl Eq for PropertyKey {}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::new(JsString::from(s))
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::new(JsString::from(s))
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::new(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        PropertyKey::new(JsString::from(idx.to_string()))
    }
}

/// Number to string conversion following the language's shortest
/// round-trip formatting rules.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(n).to_string()
}

/// Render a number in the given radix (2..=36). Radix 10 uses
/// `number_to_string`.
pub fn number_to_radix_string(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return number_to_string(n);
    }
    let negative = n < 0.0;
    let mut int_part = n.abs().trunc();
    let mut frac_part = n.abs() - int_part;

    let mut digits = Vec::new();
    if int_part == 0.0 {
        digits.push('0');
    }
    while int_part >= 1.0 {
        let digit = (int_part % radix as f64) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('0'));
        int_part = (int_part / radix as f64).trunc();
    }
    digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(digits);

    if frac_part > 0.0 {
        out.push('.');
        let mut count = 0;
        while frac_part > 0.0 && count < 20 {
            frac_part *= radix as f64;
            let digit = frac_part.trunc() as u32;
            out.push(char::from_digit(digit, radix).unwrap_or('0'));
            frac_part -= digit as f64;
            count += 1;
        }
    }
    out
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// StringToNumber: the numeric value of a string literal, or NaN.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex.is_empty() {
            return f64::NAN;
        }
        let mut value = 0.0;
        for c in hex.chars() {
            match c.to_digit(16) {
                Some(d) => value = value * 16.0 + d as f64,
                None => return f64::NAN,
            }
        }
        return value;
    }
    let unsigned = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // Rust's float parser also accepts "inf" and "nan", which the language does not.
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// ToUint32: modulo-2^32 truncation.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// ToInt32: two's-complement reinterpretation of ToUint32.
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToInteger: NaN becomes 0, otherwise truncation toward zero.
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc()
    }
}
