//! JVM type descriptor computation.
//!
//! Every accessor/constructor/method signature the other modules emit
//! needs a descriptor string; centralizing the mapping here keeps
//! `Type` -> JVM shape a single source of truth, matching §4.1's
//! centralisation rule for type comparisons.

use taylor_types::{PrimitiveName, Type};

/// The descriptor fragment for `ty` (e.g. `I` for `Int`, `Ljava/lang/String;`
/// for `String`, `Lcompany/Option;` for an erased generic).
pub fn field_descriptor(ty: &Type) -> String {
    match ty {
        Type::Primitive(PrimitiveName::Int) => "I".to_string(),
        Type::Primitive(PrimitiveName::Long) => "J".to_string(),
        Type::Primitive(PrimitiveName::Float) => "F".to_string(),
        Type::Primitive(PrimitiveName::Double) => "D".to_string(),
        Type::Primitive(PrimitiveName::Boolean) => "Z".to_string(),
        Type::Primitive(PrimitiveName::Char) => "C".to_string(),
        Type::Primitive(PrimitiveName::Unit) => "V".to_string(),
        Type::Primitive(PrimitiveName::String) => "Ljava/lang/String;".to_string(),
        Type::Named(name) => format!("L{};", internal_name(name)),
        Type::Generic(name, _) => format!("L{};", internal_name(name)),
        Type::Nullable(_) => "Ljava/lang/Object;".to_string(),
        Type::Tuple(_) => "Ljava/lang/Object;".to_string(),
        Type::Function(..) => "Ljava/util/function/Function;".to_string(),
        // A generic type parameter is erased to `Object` at the JVM boundary;
        // this is the case the spec's "generic boundary handling" exists for.
        Type::Var(_) => "Ljava/lang/Object;".to_string(),
    }
}

/// JVM internal (slash-separated) name for a declared type, unqualified --
/// the emitted classes are assumed to live in a single compilation unit's
/// package, which the driver (out of this crate's scope) is responsible
/// for placing.
pub fn internal_name(declared_name: &str) -> String {
    declared_name.to_string()
}

/// A full `(params)ret` method descriptor.
pub fn method_descriptor(params: &[Type], ret: &Type) -> String {
    let mut s = String::from("(");
    for p in params {
        s.push_str(&field_descriptor(p));
    }
    s.push(')');
    s.push_str(&field_descriptor(ret));
    s
}

/// The boxed-wrapper class and unboxing method for a primitive reached
/// through an erased `Object` accessor -- e.g. `Integer` / `intValue`.
pub fn boxed_wrapper(ty: &Type) -> Option<(&'static str, &'static str)> {
    match ty {
        Type::Primitive(PrimitiveName::Int) => Some(("java/lang/Integer", "intValue")),
        Type::Primitive(PrimitiveName::Long) => Some(("java/lang/Long", "longValue")),
        Type::Primitive(PrimitiveName::Float) => Some(("java/lang/Float", "floatValue")),
        Type::Primitive(PrimitiveName::Double) => Some(("java/lang/Double", "doubleValue")),
        Type::Primitive(PrimitiveName::Boolean) => Some(("java/lang/Boolean", "booleanValue")),
        Type::Primitive(PrimitiveName::Char) => Some(("java/lang/Character", "charValue")),
        _ => None,
    }
}
