//! Objects produced when evaluating the Monkey programming language from
//! <https://interpreterbook.com/>.

use crate::ast;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;
use std::fmt;
use std::rc::Rc;
use std::result;

use log::debug;
use thiserror::Error;

/// Objects produced when evaluating Monkey source code, along with their
/// associated data if applicable.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Rc<Array>),
    Hash(Rc<Hash>),
    ReturnValue(Box<Object>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Object {
    /// Reports the type tag of this `Object`.
    pub fn kind(&self) -> ObjectType {
        match self {
            Object::Null => ObjectType::Null,
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::ReturnValue(_) => ObjectType::Return,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
        }
    }

    /// Determines if this `Object` is the very same value as `other`, as used
    /// by `==` and `!=` on non-integer operands.
    ///
    /// `true`, `false` and `null` act as shared singletons. Arrays, hashes and
    /// functions are only identical to themselves: each literal evaluates to a
    /// fresh value, while bindings share the one they were given.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Array(l), Object::Array(r)) => Rc::ptr_eq(l, r),
            (Object::Hash(l), Object::Hash(r)) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin(l), Object::Builtin(r)) => l == r,
            _ => false,
        }
    }

    /// Determines if an object is truthy in Monkey: only `false` and `null`
    /// are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Null => write!(f, "null"),
            Object::Integer(i) => i.fmt(f),
            Object::Boolean(b) => b.fmt(f),
            Object::String(s) => write!(f, "{:?}", s),
            Object::Array(a) => a.fmt(f),
            Object::Hash(h) => h.fmt(f),
            Object::ReturnValue(r) => write!(f, "return({})", r),
            Object::Function(func) => func.fmt(f),
            Object::Builtin(_) => write!(f, "builtin function"),
        }
    }
}

/// The type tag of an `Object`, used in error messages and `HashKey`s.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ObjectType {
    Integer,
    String,
    Boolean,
    Array,
    Hash,
    Null,
    Return,
    Function,
    Builtin,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ObjectType::Integer => "Integer",
            ObjectType::String => "String",
            ObjectType::Boolean => "Boolean",
            ObjectType::Array => "Array",
            ObjectType::Hash => "Hash",
            ObjectType::Null => "Null",
            ObjectType::Return => "Return",
            ObjectType::Function => "Function",
            ObjectType::Builtin => "Builtin",
        };

        write!(f, "{}", s)
    }
}

/// An array of objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Array {
    pub elements: Vec<Object>,
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();

        write!(f, "[{}]", elements.join(", "))
    }
}

/// A normalized, type-tagged digest of a hashable `Object`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HashKey {
    pub kind: ObjectType,
    pub value: u64,
}

impl TryFrom<&Object> for HashKey {
    type Error = Error;

    fn try_from(obj: &Object) -> Result<Self> {
        let value = match obj {
            Object::Integer(i) => *i as u64,
            Object::Boolean(b) => *b as u64,
            Object::String(s) => fnv1a(s.as_bytes()),
            _ => return Err(Error::BadHashKey(obj.kind())),
        };

        Ok(HashKey {
            kind: obj.kind(),
            value,
        })
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// Computes the 64-bit FNV-1a hash of `bytes`.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// A key/value pair stored in a `Hash`, retaining the original key.
#[derive(Clone, Debug, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A hash map of `HashKey`s to key/value pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hash {
    pub pairs: BTreeMap<HashKey, HashPair>,
}

impl Hash {
    /// Retrieves the value stored under `key`, or returns `None` if no such
    /// key exists.
    pub fn get(&self, key: &HashKey) -> Option<&Object> {
        self.pairs.get(key).map(|pair| &pair.value)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .values()
            .map(|p| format!("{}: {}", p.key, p.value))
            .collect();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// An execution environment used when evaluating Monkey source code.
///
/// Cloning an `Environment` produces another handle to the same scope, so a
/// closure and the scope which defined it observe the same bindings.
#[derive(Clone, Default)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

#[derive(Default)]
struct Scope {
    store: HashMap<String, Object>,
    outer: Option<Environment>,
}

impl Environment {
    /// Creates a new `Environment`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an enclosed `Environment` for use within a function call.
    pub fn new_enclosed(outer: &Environment) -> Self {
        Environment {
            scope: Rc::new(RefCell::new(Scope {
                store: HashMap::new(),
                outer: Some(outer.clone()),
            })),
        }
    }

    /// Retrieves the object associated with an identifier name, or returns
    /// `None` if no object is associated with `name`.
    pub fn get(&self, name: &str) -> Option<Object> {
        let scope = self.scope.borrow();
        let obj = match (scope.store.get(name), &scope.outer) {
            // We found a binding in this environment; no need to consult the
            // outer environment.
            (Some(obj), _) => Some(obj.clone()),
            // We did not find a binding; try the outer environment.
            (None, Some(outer)) => outer.get(name),
            // We found no binding and there is no outer environment.
            (None, None) => None,
        };

        obj
    }

    /// Binds an object in the innermost scope with the identifier `name`,
    /// shadowing any outer binding.
    pub fn set(&self, name: &str, obj: Object) {
        self.scope.borrow_mut().store.insert(name.to_string(), obj);
    }

    /// Determines if `self` and `other` are handles to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.scope, &other.scope)
    }
}

// Scopes may contain closures which capture the very same scope, so only the
// local names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let scope = self.scope.borrow();
        let mut names: Vec<&String> = scope.store.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("enclosed", &scope.outer.is_some())
            .finish()
    }
}

/// The object representation of a Monkey function.
#[derive(Clone, Debug)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: ast::BlockStatement,
    pub env: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && self.body == other.body
            && self.env.ptr_eq(&other.env)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fn ({}){}", self.parameters.join(", "), self.body)
    }
}

/// The object representation of a built-in Monkey function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    /// Constructs a built-in using its name.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),

            _ => None,
        }
    }

    /// The name a Monkey program uses to refer to this built-in.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    /// Applies the appropriate built-in function on `args` to produce an
    /// `Object`.
    pub fn apply(self, args: &[Object]) -> Result<Object> {
        debug!("applying built-in {} to {} argument(s)", self, args.len());

        match self {
            Builtin::Len => builtin_len(args),
            Builtin::First => builtin_first(args),
            Builtin::Last => builtin_last(args),
            Builtin::Rest => builtin_rest(args),
            Builtin::Push => builtin_push(args),
            Builtin::Puts => builtin_puts(args),
        }
    }

    // Checks that exactly `want` arguments were passed.
    fn arity(self, args: &[Object], want: usize) -> Result<()> {
        if args.len() == want {
            Ok(())
        } else {
            Err(Error::BadArgumentCount {
                builtin: self,
                want,
                got: args.len(),
            })
        }
    }

    // Produces a type error for an unsupported argument.
    fn bad_argument(self, arg: &Object) -> Error {
        Error::BadArgumentType {
            builtin: self,
            got: arg.kind(),
        }
    }

    // Extracts the sole array argument of a built-in.
    fn array_argument(self, args: &[Object]) -> Result<&Array> {
        self.arity(args, 1)?;

        match &args[0] {
            Object::Array(a) => Ok(a.as_ref()),
            other => Err(self.bad_argument(other)),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn builtin_len(args: &[Object]) -> Result<Object> {
    Builtin::Len.arity(args, 1)?;

    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.len() as i64)),
        Object::Array(a) => Ok(Object::Integer(a.elements.len() as i64)),
        other => Err(Builtin::Len.bad_argument(other)),
    }
}

fn builtin_first(args: &[Object]) -> Result<Object> {
    let a = Builtin::First.array_argument(args)?;
    Ok(a.elements.first().cloned().unwrap_or(Object::Null))
}

fn builtin_last(args: &[Object]) -> Result<Object> {
    let a = Builtin::Last.array_argument(args)?;
    Ok(a.elements.last().cloned().unwrap_or(Object::Null))
}

fn builtin_rest(args: &[Object]) -> Result<Object> {
    let a = Builtin::Rest.array_argument(args)?;

    match a.elements.split_first() {
        Some((_, rest)) => Ok(Object::Array(Rc::new(Array {
            elements: rest.to_vec(),
        }))),
        None => Ok(Object::Null),
    }
}

fn builtin_push(args: &[Object]) -> Result<Object> {
    Builtin::Push.arity(args, 2)?;

    let a = match &args[0] {
        Object::Array(a) => a,
        other => return Err(Builtin::Push.bad_argument(other)),
    };

    // Built-ins never modify their arguments; push produces a new array.
    let mut elements = a.elements.clone();
    elements.push(args[1].clone());

    Ok(Object::Array(Rc::new(Array { elements })))
}

fn builtin_puts(args: &[Object]) -> Result<Object> {
    for arg in args {
        println!("{}", arg);
    }

    Ok(Object::Null)
}

/// A Result type specialized use with for an Error.
pub type Result<T> = result::Result<T, Error>;

/// Specifies the different classes of errors which may occur.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("built-in {builtin} expects {want} argument(s), but got {got}")]
    BadArgumentCount {
        builtin: Builtin,
        want: usize,
        got: usize,
    },
    #[error("built-in {builtin} does not support argument of type {got}")]
    BadArgumentType { builtin: Builtin, got: ObjectType },
    #[error("bad hash key: {0} is not hashable")]
    BadHashKey(ObjectType),
}
