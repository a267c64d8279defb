//! Dynamic host values.
//!
//! `Value` stands for anything a caller of the untyped API can hand the map:
//! the absence sentinel, null, booleans, numbers (NaN and signed zero
//! included), strings, and reference values (arrays, objects, functions,
//! maps). Primitives compare by SameValueZero; reference values compare by
//! identity, so two distinct arrays with equal contents are distinct keys.

use crate::map::SMap;
use crate::same_value::{f64_canonical_bits, f64_same_value_zero, SameValueZero};
use core::cell::RefCell;
use core::fmt;
use core::hash::Hasher;
use std::rc::Rc;

/// A map keyed and valued by host values, shared by reference.
pub type MapRef = Rc<RefCell<SMap<Value, Value>>>;

type NativeFn = dyn Fn(&Value, &[Value]) -> Value;

/// A callable host value: a native closure plus the parameter count it
/// declares. The first argument of the closure is the bound `this`.
#[derive(Clone)]
pub struct Function {
    arity: usize,
    call: Rc<NativeFn>,
}

impl Function {
    pub fn new<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + 'static,
    {
        Self {
            arity,
            call: Rc::new(f),
        }
    }

    /// Number of parameters the function declares.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Value {
        (self.call)(this, args)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.call) as *const ()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function/{}]", self.arity)
    }
}

#[derive(Clone, Default)]
pub enum Value {
    /// The absence sentinel.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<[Value]>),
    Object(Rc<[(Rc<str>, Value)]>),
    Function(Function),
    Map(MapRef),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(items.into_iter().collect())
    }

    pub fn object<I, S>(props: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        Value::Object(
            props
                .into_iter()
                .map(|(k, v)| (Rc::from(k.as_ref()), v))
                .collect(),
        )
    }

    pub fn function<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + 'static,
    {
        Value::Function(Function::new(arity, f))
    }

    pub fn map(map: SMap<Value, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Host truthiness: `undefined`, `null`, `false`, `0`, `-0`, NaN and the
    /// empty string are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Map(_) => true,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Value::Undefined => 0,
            Value::Null => 1,
            Value::Bool(_) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
            Value::Function(_) => 7,
            Value::Map(_) => 8,
        }
    }
}

impl SameValueZero for Value {
    fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => f64_same_value_zero(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.addr() == b.addr(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn hash_same_value<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.tag());
        match self {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => state.write_u8(*b as u8),
            Value::Number(n) => state.write_u64(f64_canonical_bits(*n)),
            Value::String(s) => state.write(s.as_bytes()),
            Value::Array(a) => state.write_usize(Rc::as_ptr(a) as *const () as usize),
            Value::Object(o) => state.write_usize(Rc::as_ptr(o) as *const () as usize),
            Value::Function(f) => state.write_usize(f.addr() as usize),
            Value::Map(m) => state.write_usize(Rc::as_ptr(m) as *const () as usize),
        }
    }
}

/// `==` on values is SameValueZero, so `NaN == NaN` holds here.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value_zero(other)
    }
}

thread_local! {
    static PRINTING: RefCell<Vec<*const RefCell<SMap<Value, Value>>>> = const { RefCell::new(Vec::new()) };
}

/// Marks a map as being printed on this thread until dropped. A map that
/// (directly or through other maps) contains itself prints its inner
/// occurrence as `Map{<circular>}`.
struct Printing;

impl Printing {
    fn enter(map: &MapRef) -> Option<Printing> {
        let ptr = Rc::as_ptr(map);
        PRINTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&ptr) {
                return None;
            }
            stack.push(ptr);
            Some(Printing)
        })
    }
}

impl Drop for Printing {
    fn drop(&mut self) {
        PRINTING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Array(a) => f.debug_list().entries(a.iter()).finish(),
            Value::Object(o) => f
                .debug_map()
                .entries(o.iter().map(|(k, v)| (&**k, v)))
                .finish(),
            Value::Function(func) => fmt::Debug::fmt(func, f),
            Value::Map(m) => {
                let Some(_printing) = Printing::enter(m) else {
                    return f.write_str("Map{<circular>}");
                };
                match m.try_borrow() {
                    Ok(m) => write!(f, "Map{:?}", &*m),
                    Err(_) => f.write_str("Map{<borrowed>}"),
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Undefined, Into::into)
    }
}

impl From<SMap<Value, Value>> for Value {
    fn from(m: SMap<Value, Value>) -> Self {
        Value::map(m)
    }
}
