use std::cell::RefCell;
use std::rc::Rc;

use crate::scope::Scope;
use crate::value::{TypeObj, Value};

/// The canonical stable type-name strings for every primitive variant
/// (§4.1). `Instance` is deliberately absent: its type name is its own
/// `TypeObj`'s name, not one of these.
const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "Nil", "Boolean", "Integer", "Float", "String", "Symbol", "List", "Map", "Type",
];

/// The root "kernel" scope (§4.5): holds the canonical `TypeObj` for every
/// primitive variant, seeded once at interpreter startup. `type_of`
/// resolves a primitive value to its canonical type by name; repeated
/// calls return the identical `Rc`, which is what makes type-pattern
/// matching (`matcher::collect`'s `ConstPattern` arm) a pointer
/// comparison rather than a name comparison.
#[derive(Debug)]
pub struct Kernel {
    types: RefCell<Vec<(Rc<str>, Rc<TypeObj>)>>,
}

impl Kernel {
    pub fn new() -> Self {
        let kernel = Self {
            types: RefCell::new(Vec::new()),
        };
        kernel.populate();
        kernel
    }

    fn populate(&self) {
        let mut types = self.types.borrow_mut();
        for name in PRIMITIVE_TYPE_NAMES {
            let name: Rc<str> = Rc::from(*name);
            types.push((
                name.clone(),
                Rc::new(TypeObj {
                    name,
                    instance_scope: Rc::new(RefCell::new(Scope::new())),
                }),
            ));
        }
    }

    /// Look up a canonical type by name, e.g. the `Const` token `String`
    /// used as a `ConstReference` or as a `ConstPattern`.
    pub fn type_of(&self, name: &str) -> Option<Rc<TypeObj>> {
        self.types
            .borrow()
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, t)| t.clone())
    }

    /// `type_of(value)` (§4.5): for `Instance`, the instance's own type;
    /// for everything else, the canonical kernel type matching the
    /// value's `type_name`.
    pub fn type_of_value(&self, value: &Value) -> Option<Rc<TypeObj>> {
        match value {
            Value::Instance(inst) => Some(inst.ty.clone()),
            other => self.type_of(&other.type_name()),
        }
    }

    /// `disallow_primitives` (§4.5): raise when a primitive is asked to
    /// act as if it owned an instance scope of its own.
    pub fn disallow_primitives(&self, value: &Value, op: &str) -> crate::error::Result<()> {
        match value {
            Value::Instance(_) | Value::Type(_) => Ok(()),
            other => Err(crate::error::Error::UnsupportedOperation {
                op: op.to_string(),
                left: other.type_name(),
                right: String::new(),
                loc: crate::location::Location::internal(),
            }),
        }
    }

    /// `scope_of(value)` (§4.5): the instance's own scope for `Instance`,
    /// a type's instance scope for `Type`, or the instance scope of the
    /// value's canonical type for everything else.
    pub fn scope_of(&self, value: &Value) -> Option<Rc<RefCell<Scope>>> {
        match value {
            Value::Instance(inst) => Some(inst.scope.clone()),
            Value::Type(ty) => Some(ty.instance_scope.clone()),
            other => self.type_of_value(other).map(|ty| ty.instance_scope.clone()),
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_of_name_returns_stable_identity() {
        let kernel = Kernel::new();
        let a = kernel.type_of("Integer").unwrap();
        let b = kernel.type_of("Integer").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn type_of_value_matches_primitive_by_name() {
        let kernel = Kernel::new();
        let int_type = kernel.type_of("Integer").unwrap();
        let resolved = kernel.type_of_value(&Value::Int(5)).unwrap();
        assert!(Rc::ptr_eq(&int_type, &resolved));
    }

    #[test]
    fn unknown_const_name_resolves_to_none() {
        let kernel = Kernel::new();
        assert!(kernel.type_of("NotAType").is_none());
    }

    #[test]
    fn disallow_primitives_rejects_plain_values() {
        let kernel = Kernel::new();
        assert!(kernel.disallow_primitives(&Value::Int(1), "scope_of").is_err());
    }
}
