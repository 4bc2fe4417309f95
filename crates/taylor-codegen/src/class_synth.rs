//! Synthesizes the class shapes §6's bytecode contract names for every
//! declared union type: an abstract parent `T` carrying one `isC()`
//! predicate per variant, and one concrete nested class `T$C` per variant
//! carrying `field_1..field_k`, a constructor, and `getField_i()`
//! accessors.

use taylor_types::{PrimitiveName, Type};

use crate::classdef::{jvm_local_type, ClassDef, FieldDef, JvmLocalType, MethodDef};
use crate::descriptor::{field_descriptor, internal_name, method_descriptor};
use crate::instr::Instruction;
use crate::slot::{width_of, Width};
use crate::union_layout::{UnionLayout, UnionRegistry};

const OBJECT: &str = "java/lang/Object";

pub fn synthesize_union_classes(registry: &UnionRegistry) -> Vec<ClassDef> {
    let mut classes = Vec::new();
    for layout in registry.layouts() {
        // `Option`/`Result`/`List`/`Pair`'s class files ship with the
        // runtime library (see `UnionLayout::is_builtin`'s doc comment);
        // this compiler only needs their layout to reference field types
        // and class names, never to emit bytecode for them.
        if layout.is_builtin {
            continue;
        }
        classes.push(synthesize_parent(layout));
        for variant in &layout.variants {
            classes.push(synthesize_variant(layout, &variant.name, &variant.field_types));
        }
    }
    classes
}

fn synthesize_parent(layout: &UnionLayout) -> ClassDef {
    let mut def = ClassDef::new(internal_name(&layout.type_name), OBJECT, true);
    for variant in &layout.variants {
        def.methods.push(is_variant_predicate(layout, &variant.name));
    }
    def
}

fn is_variant_predicate(layout: &UnionLayout, variant_name: &str) -> MethodDef {
    let class_name = layout.variant_class_name(variant_name);
    MethodDef {
        name: format!("is{variant_name}"),
        descriptor: "()Z".to_string(),
        is_static: false,
        max_locals: 1,
        instructions: vec![
            Instruction::Aload(0),
            Instruction::Instanceof(class_name),
            Instruction::Ireturn,
        ],
        exception_handlers: Vec::new(),
        local_types: vec![JvmLocalType::Reference],
    }
}

fn synthesize_variant(layout: &UnionLayout, variant_name: &str, field_types: &[Type]) -> ClassDef {
    let class_name = layout.variant_class_name(variant_name);
    let mut def = ClassDef::new(class_name.clone(), internal_name(&layout.type_name), false);

    for (i, ty) in field_types.iter().enumerate() {
        def.fields.push(FieldDef { name: format!("field_{}", i + 1), descriptor: field_descriptor(ty) });
    }
    def.methods.push(constructor(&class_name, &layout.type_name, field_types));
    for (i, ty) in field_types.iter().enumerate() {
        def.methods.push(accessor(&class_name, i, ty));
    }
    def
}

fn load_field(ty: &Type, slot: u16) -> Instruction {
    match width_of(ty) {
        // Only `Double` is a two-slot field type this registry ever
        // produces (`Long` has no surface syntax reaching a variant
        // field); widening it further would need a real `Long` case.
        Width::Two => Instruction::Dload(slot),
        Width::One => match ty {
            Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
                Instruction::Iload(slot)
            }
            _ => Instruction::Aload(slot),
        },
    }
}

fn return_for_field(ty: &Type) -> Instruction {
    match width_of(ty) {
        Width::Two => Instruction::Dreturn,
        Width::One => match ty {
            Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
                Instruction::Ireturn
            }
            _ => Instruction::Areturn,
        },
    }
}

fn constructor(class_name: &str, super_class: &str, field_types: &[Type]) -> MethodDef {
    // Param slot `0` is `this`; parameters follow in declaration order,
    // each occupying `width_of(ty)` slots.
    let mut instructions = vec![
        Instruction::Aload(0),
        Instruction::Invokespecial {
            owner: internal_name(super_class),
            name: "<init>".to_string(),
            descriptor: "()V".to_string(),
        },
    ];

    let mut slot = 1u16;
    for (i, ty) in field_types.iter().enumerate() {
        instructions.push(Instruction::Aload(0));
        instructions.push(load_field(ty, slot));
        instructions.push(Instruction::Putfield {
            owner: class_name.to_string(),
            name: format!("field_{}", i + 1),
            descriptor: field_descriptor(ty),
        });
        slot += match width_of(ty) {
            Width::Two => 2,
            Width::One => 1,
        };
    }
    instructions.push(Instruction::Return);

    let mut local_types = Vec::with_capacity(field_types.len() + 1);
    local_types.push(JvmLocalType::Reference); // this
    local_types.extend(field_types.iter().map(|ty| jvm_local_type(ty)));

    MethodDef {
        name: "<init>".to_string(),
        descriptor: method_descriptor(field_types, &Type::unit()),
        is_static: false,
        max_locals: slot,
        instructions,
        exception_handlers: Vec::new(),
        local_types,
    }
}

fn accessor(class_name: &str, index: usize, ty: &Type) -> MethodDef {
    let descriptor = field_descriptor(ty);
    let ret = return_for_field(ty);
    MethodDef {
        name: format!("getField_{}", index + 1),
        descriptor: format!("(){descriptor}"),
        is_static: false,
        max_locals: 1,
        instructions: vec![
            Instruction::Aload(0),
            Instruction::Getfield { owner: class_name.to_string(), name: format!("field_{}", index + 1), descriptor },
            ret,
        ],
        exception_handlers: Vec::new(),
        local_types: vec![JvmLocalType::Reference],
    }
}
