//! Type representation for the TaylorLang type system.
//!
//! Defines [`Type`], the closed sum of every shape a TaylorLang type can
//! take, [`TypeVar`] (the only source of inference unknowns), and
//! [`TypeScheme`] (polymorphic, `forall`-quantified types). The kind system
//! admits only `*` -- there is no higher-kinded polymorphism here, so a
//! `TypeVar` never itself needs a kind annotation beyond "a type".

use std::fmt;

use rustc_hash::FxHashSet;

/// A primitive, nullary type constructor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveName {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Unit,
    Char,
}

impl fmt::Display for PrimitiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveName::Int => "Int",
            PrimitiveName::Long => "Long",
            PrimitiveName::Float => "Float",
            PrimitiveName::Double => "Double",
            PrimitiveName::Boolean => "Boolean",
            PrimitiveName::String => "String",
            PrimitiveName::Unit => "Unit",
            PrimitiveName::Char => "Char",
        };
        write!(f, "{s}")
    }
}

/// A type variable, identified by a globally unique `u32` index.
///
/// `debug_name` exists purely to make error messages and `Debug` output
/// readable (e.g. `?a` instead of `?17`); it is intentionally excluded from
/// equality and hashing so two vars with the same id are always the same
/// variable regardless of how each was annotated.
#[derive(Clone, Debug)]
pub struct TypeVar {
    pub id: u32,
    pub debug_name: Option<String>,
}

impl TypeVar {
    pub fn new(id: u32) -> Self {
        TypeVar { id, debug_name: None }
    }

    pub fn named(id: u32, name: impl Into<String>) -> Self {
        TypeVar { id, debug_name: Some(name.into()) }
    }
}

impl PartialEq for TypeVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for TypeVar {}

impl std::hash::Hash for TypeVar {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.debug_name {
            Some(name) => write!(f, "?{name}"),
            None => write!(f, "?{}", self.id),
        }
    }
}

/// A TaylorLang type.
///
/// `Var` is the *only* source of inference unknowns -- every other variant
/// is either a primitive, a user/runtime-declared name, or a structural
/// composition of other types. `Nullable(T)` is kept distinct from
/// `Generic("Option", [T])` syntactically (for codegen, which must emit
/// different accessors for boxed-null vs. the runtime `Option` ADT) but the
/// two are treated as equivalent by unification (see `taylor_types::unify`).
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Primitive(PrimitiveName),
    /// A user-declared union or product type with no type arguments.
    Named(String),
    /// A parameterized application, e.g. `Result<Int, IOException>`.
    Generic(String, Vec<Type>),
    Tuple(Vec<Type>),
    /// Sugar for `Generic("Option", [T])`; preserved distinctly through
    /// elaboration because codegen must know whether a value was written
    /// with `?` syntax or the `Option` constructors.
    Nullable(Box<Type>),
    Function(Vec<Type>, Box<Type>),
    Var(TypeVar),
}

impl Type {
    pub fn int() -> Type {
        Type::Primitive(PrimitiveName::Int)
    }
    pub fn long() -> Type {
        Type::Primitive(PrimitiveName::Long)
    }
    pub fn float() -> Type {
        Type::Primitive(PrimitiveName::Float)
    }
    pub fn double() -> Type {
        Type::Primitive(PrimitiveName::Double)
    }
    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveName::Boolean)
    }
    pub fn string() -> Type {
        Type::Primitive(PrimitiveName::String)
    }
    pub fn unit() -> Type {
        Type::Primitive(PrimitiveName::Unit)
    }
    pub fn char() -> Type {
        Type::Primitive(PrimitiveName::Char)
    }

    pub fn option(inner: Type) -> Type {
        Type::Generic("Option".to_string(), vec![inner])
    }

    pub fn result(ok: Type, err: Type) -> Type {
        Type::Generic("Result".to_string(), vec![ok, err])
    }

    pub fn list(inner: Type) -> Type {
        Type::Generic("List".to_string(), vec![inner])
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Generic("Map".to_string(), vec![key, value])
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(params, Box::new(ret))
    }

    /// Whether this type, as written, is `Result<_, _>` (used to decide
    /// `try`-expression pass-through vs. wrap semantics -- see
    /// `taylor_infer::collector`).
    pub fn as_result_args(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Generic(name, args) if name == "Result" && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// Structural free type variables of this type (no substitution applied).
    pub fn free_vars(&self) -> FxHashSet<u32> {
        let mut out = FxHashSet::default();
        collect_free_vars(self, &mut out);
        out
    }
}

fn collect_free_vars(ty: &Type, out: &mut FxHashSet<u32>) {
    match ty {
        Type::Var(v) => {
            out.insert(v.id);
        }
        Type::Primitive(_) | Type::Named(_) => {}
        Type::Generic(_, args) => {
            for a in args {
                collect_free_vars(a, out);
            }
        }
        Type::Tuple(elems) => {
            for e in elems {
                collect_free_vars(e, out);
            }
        }
        Type::Nullable(inner) => collect_free_vars(inner, out),
        Type::Function(params, ret) => {
            for p in params {
                collect_free_vars(p, out);
            }
            collect_free_vars(ret, out);
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Named(n) => write!(f, "{n}"),
            Type::Generic(name, args) => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Function(params, ret) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Var(v) => write!(f, "{v}"),
        }
    }
}

/// A polymorphic type scheme `forall quantified. body`.
///
/// Monomorphic types are represented with an empty `quantified` set.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeScheme {
    pub quantified: Vec<TypeVar>,
    pub body: Type,
}

impl TypeScheme {
    pub fn mono(body: Type) -> Self {
        TypeScheme { quantified: Vec::new(), body }
    }

    pub fn poly(quantified: Vec<TypeVar>, body: Type) -> Self {
        TypeScheme { quantified, body }
    }

    /// Free type variables of the scheme: those of `body` minus those
    /// quantified over.
    pub fn free_vars(&self) -> FxHashSet<u32> {
        let mut fv = self.body.free_vars();
        for v in &self.quantified {
            fv.remove(&v.id);
        }
        fv
    }
}
