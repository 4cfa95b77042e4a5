use std::rc::Rc;

use crate::ast::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::value::Value;

/// Matches `pattern` against `value`. On success, every binding the
/// pattern introduces is committed to the evaluator's active scope frame;
/// on failure, nothing is bound — bindings are staged in a local buffer
/// during the recursive walk and only applied once the whole pattern has
/// matched, so a partially-matching list or map pattern never leaks
/// bindings from the prefix that did match (§3.4, §8.1).
pub fn match_pattern(evaluator: &mut Evaluator, pattern: &Rc<Node>, value: &Value) -> Result<bool> {
    let mut bindings = Vec::new();
    if collect(evaluator, pattern, value, &mut bindings)? {
        for (name, bound) in bindings {
            evaluator.scope_mut().set_new(name, bound);
        }
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Shared by `ConstPattern` and `InterpolationExpression`-as-pattern: a
/// resolved value that turns out to be a `Type` does a type check
/// against `value`; anything else does a literal equality match.
fn match_resolved(evaluator: &Evaluator, resolved: &Value, value: &Value) -> bool {
    match resolved {
        Value::Type(ty) => evaluator
            .kernel()
            .type_of_value(value)
            .map(|vty| Rc::ptr_eq(&vty, ty))
            .unwrap_or(false),
        other => other == value,
    }
}

fn collect(
    evaluator: &mut Evaluator,
    pattern: &Rc<Node>,
    value: &Value,
    bindings: &mut Vec<(Rc<str>, Value)>,
) -> Result<bool> {
    match &pattern.kind {
        NodeKind::BindingPattern(name) => {
            bindings.push((name.clone(), value.clone()));
            Ok(true)
        }

        NodeKind::SplatPattern(_) => {
            // Only meaningful inside ListPattern, which handles it directly.
            Err(Error::Runtime {
                message: "splat pattern outside of a list pattern".to_string(),
                loc: pattern.loc.clone(),
            })
        }

        NodeKind::InterpolationExpression(inner) => {
            let resolved = evaluator.eval_node_value(inner)?;
            Ok(match_resolved(evaluator, &resolved, value))
        }

        NodeKind::ConstPattern(name) => {
            let resolved = evaluator.resolve_const(name, &pattern.loc)?;
            Ok(match_resolved(evaluator, &resolved, value))
        }

        NodeKind::ListPattern(elements) => {
            let list = match value {
                Value::List(items) => items,
                _ => return Ok(false),
            };
            let items = list.borrow();

            let splat_index = elements
                .iter()
                .position(|e| matches!(e.kind, NodeKind::SplatPattern(_)));

            match splat_index {
                None => {
                    if elements.len() != items.len() {
                        return Ok(false);
                    }
                    for (sub, val) in elements.iter().zip(items.iter()) {
                        if !collect(evaluator, sub, val, bindings)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Some(idx) => {
                    let before = &elements[..idx];
                    let after = &elements[idx + 1..];
                    if items.len() < before.len() + after.len() {
                        return Ok(false);
                    }
                    for (sub, val) in before.iter().zip(items.iter()) {
                        if !collect(evaluator, sub, val, bindings)? {
                            return Ok(false);
                        }
                    }
                    let tail_start = items.len() - after.len();
                    // Always a List, even when it captures zero or
                    // exactly one (possibly List-typed) element (§8.3).
                    let middle: Vec<Value> = items[before.len()..tail_start].to_vec();
                    if let NodeKind::SplatPattern(name) = &elements[idx].kind {
                        bindings.push((name.clone(), Value::new_list(middle)));
                    }
                    for (sub, val) in after.iter().zip(items[tail_start..].iter()) {
                        if !collect(evaluator, sub, val, bindings)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
            }
        }

        NodeKind::MapPattern(pairs) => {
            let map = match value {
                Value::Map(entries) => entries,
                _ => return Ok(false),
            };
            let entries = map.borrow();
            for (key_node, val_pattern) in pairs {
                let key = evaluator.eval_node_value(key_node)?;
                let found = entries.iter().find(|(k, _)| *k == key);
                match found {
                    Some((_, v)) => {
                        if !collect(evaluator, val_pattern, v, bindings)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }

        // Any other node kind is a literal used as a pattern: evaluate it
        // and compare for equality (§4.4's literal row). Covers
        // IntegerLiteral, FloatLiteral, StringLiteral,
        // InterpolatedStringLiteral, SymbolLiteral, BooleanLiteral, and
        // NilLiteral.
        _ => {
            let evaluated = evaluator.eval_node_value(pattern)?;
            Ok(evaluated == *value)
        }
    }
}
