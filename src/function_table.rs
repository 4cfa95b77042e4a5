use std::rc::Rc;

use crate::value::FunctorDef;

/// The table of functors defined with `def`. Separate from [`crate::scope::Scope`]
/// because function definitions are hoisted process-wide rather than
/// following the same restrictive-frame lookup rules as ordinary bindings —
/// a function can call another function defined later in the same block.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: Vec<(Rc<str>, Rc<FunctorDef>)>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    pub fn define(&mut self, def: Rc<FunctorDef>) {
        if let Some(slot) = self.functions.iter_mut().find(|(n, _)| *n == def.name) {
            slot.1 = def;
        } else {
            self.functions.push((def.name.clone(), def));
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctorDef>> {
        self.functions
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, f)| f.clone())
    }
}
