//! Interned type table for the program model.
//!
//! Types are structural and deduplicated; a `TypeId` is stable for the
//! lifetime of the `Program`. Named (non-literal) structs are interned
//! shallow, with no field list: everything that compares them does so by
//! name, so their bodies are never needed.

use std::collections::HashMap;

/// Identifier of an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Integer { bits: u32 },
    Float { bits: u32 },
    Pointer { pointee: TypeId, addr_space: u32 },
    Array { elem: TypeId, len: u64 },
    Vector { elem: TypeId, len: u64 },
    /// `name` is present iff the struct is non-literal; literal structs
    /// carry their field list instead.
    Struct {
        name: Option<String>,
        literal: bool,
        fields: Vec<TypeId>,
    },
    Function {
        ret: TypeId,
        params: Vec<TypeId>,
        var_arg: bool,
    },
    Metadata,
    Label,
    Other,
}

/// Deduplicating type pool.
#[derive(Debug, Default)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    interned: HashMap<TypeKind, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.interned.insert(kind, id);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.0 as usize]
    }

    pub fn void(&mut self) -> TypeId {
        self.intern(TypeKind::Void)
    }

    pub fn int(&mut self, bits: u32) -> TypeId {
        self.intern(TypeKind::Integer { bits })
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer { pointee, addr_space: 0 })
    }

    pub fn named_struct(&mut self, name: &str) -> TypeId {
        self.intern(TypeKind::Struct {
            name: Some(name.to_string()),
            literal: false,
            fields: Vec::new(),
        })
    }

    pub fn function(&mut self, ret: TypeId, params: Vec<TypeId>, var_arg: bool) -> TypeId {
        self.intern(TypeKind::Function { ret, params, var_arg })
    }

    /// Pointer to a function type.
    pub fn is_function_pointer(&self, id: TypeId) -> bool {
        match self.kind(id) {
            TypeKind::Pointer { pointee, .. } => {
                matches!(self.kind(*pointee), TypeKind::Function { .. })
            }
            _ => false,
        }
    }

    /// Pointer to an 8-bit integer, the `void*` / `char*` family.
    pub fn is_void_pointer(&self, id: TypeId) -> bool {
        match self.kind(id) {
            TypeKind::Pointer { pointee, .. } => {
                matches!(self.kind(*pointee), TypeKind::Integer { bits: 8 })
            }
            _ => false,
        }
    }
}
