use std::rc::Rc;

use crate::ast::{ArithOp, EqOp, LogicOp, Node, NodeKind, RelOp, UnaryOp};
use crate::error::{Error, Result};
use crate::function_table::FunctionTable;
use crate::kernel::Kernel;
use crate::location::Location;
use crate::matcher::match_pattern;
use crate::scope::Scope;
use crate::stack::EvalStack;
use crate::value::{FunctorDef, Value};

/// Walks a [`Node`] tree, pushing exactly one [`Value`] onto its
/// [`EvalStack`] per node visited. The recursion itself (`eval_node`
/// calling itself for sub-nodes) is what gives the language its dynamic
/// call stack; there is no separate bytecode or continuation machinery.
pub struct Evaluator {
    scope: Scope,
    functions: FunctionTable,
    kernel: Kernel,
    stack: EvalStack,
    call_depth: usize,
    max_call_depth: usize,
}

impl Evaluator {
    pub fn new(max_call_depth: usize) -> Self {
        Self {
            scope: Scope::new(),
            functions: FunctionTable::new(),
            kernel: Kernel::new(),
            stack: EvalStack::new(),
            call_depth: 0,
            max_call_depth,
        }
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Evaluates `node`, pushing its result, then immediately pops and
    /// returns it. Convenience wrapper for sub-evaluations (operands,
    /// pattern components, argument lists) that only care about the
    /// value, not the raw stack effect.
    pub fn eval_node_value(&mut self, node: &Rc<Node>) -> Result<Value> {
        self.eval_node(node)?;
        self.stack.pop()
    }

    /// Runs `node` as a full program and returns the value it leaves on
    /// the stack.
    pub fn run(&mut self, node: &Rc<Node>) -> Result<Value> {
        self.eval_node(node)?;
        self.stack.pop()
    }

    pub fn eval_node(&mut self, node: &Rc<Node>) -> Result<()> {
        let before = self.stack.len();
        self.dispatch(node)?;
        debug_assert_eq!(
            self.stack.len(),
            before + 1,
            "every node must leave exactly one value on the stack"
        );
        Ok(())
    }

    /// Shared by `ConstReference` and `ConstPattern`: a `Const` name
    /// resolves to a canonical kernel type first, falling back to an
    /// ordinary scope binding (a `Const` may just be an uppercase
    /// variable, per §4.4's "resolving to any non-Type Value" row).
    pub fn resolve_const(&mut self, name: &str, loc: &Location) -> Result<Value> {
        self.kernel
            .type_of(name)
            .map(Value::Type)
            .or_else(|| self.scope.get(name).cloned())
            .ok_or_else(|| Error::UndefinedVariable {
                name: name.to_string(),
                loc: loc.clone(),
            })
    }

    fn dispatch(&mut self, node: &Rc<Node>) -> Result<()> {
        tracing::trace!(kind = node.kind.name(), loc = %node.loc, "dispatch");
        match &node.kind {
            NodeKind::IntegerLiteral(i) => self.stack.push(Value::Int(*i)),
            NodeKind::FloatLiteral(f) => self.stack.push(Value::Float(*f)),
            NodeKind::StringLiteral(s) => self.stack.push(Value::String(s.clone())),
            NodeKind::SymbolLiteral(s) => self.stack.push(Value::Symbol(s.clone())),
            NodeKind::BooleanLiteral(b) => self.stack.push(Value::Bool(*b)),
            NodeKind::NilLiteral => self.stack.push(Value::Nil),

            NodeKind::InterpolatedStringLiteral(parts) => {
                let mut out = String::new();
                for part in parts {
                    let value = self.eval_node_value(part)?;
                    out.push_str(&value.to_s());
                }
                self.stack.push(Value::String(Rc::from(out.as_str())));
            }

            NodeKind::ListLiteral(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_node_value(item)?);
                }
                self.stack.push(Value::new_list(values));
            }

            NodeKind::MapLiteral(pairs) => {
                let mut values = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let key = self.eval_node_value(k)?;
                    let val = self.eval_node_value(v)?;
                    values.push((key, val));
                }
                self.stack.push(Value::new_map(values));
            }

            NodeKind::InterpolationExpression(inner) => {
                let value = self.eval_node_value(inner)?;
                self.stack.push(value);
            }

            NodeKind::VariableReference(name) => {
                let value = self
                    .scope
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UndefinedVariable {
                        name: name.to_string(),
                        loc: node.loc.clone(),
                    })?;
                self.stack.push(value);
            }

            NodeKind::ConstReference(name) => {
                let value = self.resolve_const(name, &node.loc)?;
                self.stack.push(value);
            }

            NodeKind::SimpleAssignment { name, value } => {
                let v = self.eval_node_value(value)?;
                self.scope.set_existing_or_new(name.clone(), v.clone());
                self.stack.push(v);
            }

            NodeKind::MatchAssign { pattern, value } => {
                let v = self.eval_node_value(value)?;
                if match_pattern(self, pattern, &v)? {
                    self.stack.push(v);
                } else {
                    return Err(Error::Match {
                        loc: node.loc.clone(),
                    });
                }
            }

            NodeKind::BindingPattern(_)
            | NodeKind::SplatPattern(_)
            | NodeKind::ListPattern(_)
            | NodeKind::MapPattern(_)
            | NodeKind::ConstPattern(_) => {
                return Err(Error::UnsupportedNode {
                    kind: "pattern node evaluated outside of a match".to_string(),
                    loc: node.loc.clone(),
                });
            }

            NodeKind::BinaryExpression { op, left, right } => {
                let l = self.eval_node_value(left)?;
                let r = self.eval_node_value(right)?;
                let result = self.apply_arith(*op, &l, &r, &node.loc)?;
                self.stack.push(result);
            }

            NodeKind::EqualityExpression { op, left, right } => {
                let l = self.eval_node_value(left)?;
                let r = self.eval_node_value(right)?;
                let result = match op {
                    EqOp::Eq => l == r,
                    EqOp::NotEq => l != r,
                };
                self.stack.push(Value::Bool(result));
            }

            NodeKind::RelationalExpression { op, left, right } => {
                let l = self.eval_node_value(left)?;
                let r = self.eval_node_value(right)?;
                let result = self.apply_relational(*op, &l, &r, &node.loc)?;
                self.stack.push(Value::Bool(result));
            }

            NodeKind::LogicalExpression { op, left, right } => {
                // Strict evaluation per §4.3's description is the spec
                // minimum; §9 leaves short-circuiting open and recommends
                // it for user-expected semantics, so both operands are
                // only evaluated when the result actually depends on the
                // second one.
                let l = self.eval_node_value(left)?;
                let result = match op {
                    LogicOp::And => {
                        if !l.is_truthy() {
                            l
                        } else {
                            self.eval_node_value(right)?
                        }
                    }
                    LogicOp::Or => {
                        if l.is_truthy() {
                            l
                        } else {
                            self.eval_node_value(right)?
                        }
                    }
                };
                self.stack.push(result);
            }

            NodeKind::UnaryExpression { op, operand } => {
                let v = self.eval_node_value(operand)?;
                let result = match op {
                    UnaryOp::Not => Value::Bool(!v.is_truthy()),
                    UnaryOp::Negate => match v {
                        Value::Int(i) => Value::Int(-i),
                        Value::Float(f) => Value::Float(-f),
                        other => {
                            return Err(Error::UnsupportedOperation {
                                op: "unary -".to_string(),
                                left: other.type_name(),
                                right: String::new(),
                                loc: node.loc.clone(),
                            })
                        }
                    },
                };
                self.stack.push(result);
            }

            NodeKind::FunctionDefinition { name, params, body } => {
                let def = Rc::new(FunctorDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                });
                self.functions.define(def.clone());
                self.stack.push(Value::Functor(def));
            }

            NodeKind::FunctionCall { name, args } => {
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_node_value(arg)?);
                }
                let result = self.call(name, arg_values, &node.loc)?;
                self.stack.push(result);
            }

            NodeKind::Block(nodes) | NodeKind::ExpressionList(nodes) => {
                let mut last = Value::Nil;
                for n in nodes {
                    last = self.eval_node_value(n)?;
                }
                self.stack.push(last);
            }
        }
        Ok(())
    }

    /// Resolves and invokes a call by name (§4.3: "callee must resolve to
    /// a function-table entry by identifier"). `type` is the one builtin
    /// recognized directly here, the same way the `len` builtin is
    /// special-cased ahead of the user function table in a plain
    /// tree-walker; everything else must be a user-defined functor.
    fn call(&mut self, name: &str, args: Vec<Value>, loc: &Location) -> Result<Value> {
        if name == "type" {
            if args.len() != 1 {
                return Err(Error::Arity {
                    expected: 1,
                    got: args.len(),
                    loc: loc.clone(),
                });
            }
            return Ok(self
                .kernel
                .type_of_value(&args[0])
                .map(Value::Type)
                .unwrap_or(Value::Nil));
        }

        let func = self
            .functions
            .get(name)
            .ok_or_else(|| Error::CallTarget {
                name: name.to_string(),
                loc: loc.clone(),
            })?;

        if self.call_depth >= self.max_call_depth {
            return Err(Error::Runtime {
                message: "maximum call depth exceeded".to_string(),
                loc: loc.clone(),
            });
        }

        tracing::debug!(name, depth = self.call_depth + 1, "call");
        self.scope.push(true);
        tracing::debug!(depth = self.call_depth + 1, "scope push");
        self.call_depth += 1;
        let outcome = self
            .bind_params(&func, args, loc)
            .and_then(|()| self.eval_node_value(&func.body));
        self.call_depth -= 1;
        let pop_outcome = self.scope.pop();
        tracing::debug!(depth = self.call_depth + 1, "scope pop");
        tracing::debug!(name, ok = outcome.is_ok(), "return");

        match outcome {
            Ok(v) => pop_outcome.map(|_| v),
            Err(e) => Err(e),
        }
    }

    /// Binds positional arguments to parameters in the just-pushed
    /// restrictive frame with `make_new=true` (§4.3). At most one
    /// parameter may be a splat; it absorbs any arguments beyond what the
    /// non-splat parameters need, always as a `List` (§4.4's splat
    /// wrapping rule applies here too, per §9's "behaves as the
    /// match-engine splat").
    fn bind_params(&mut self, func: &Rc<FunctorDef>, args: Vec<Value>, loc: &Location) -> Result<()> {
        let splat_index = func.params.iter().position(|p| p.splat);
        match splat_index {
            None => {
                if func.params.len() != args.len() {
                    return Err(Error::Arity {
                        expected: func.params.len(),
                        got: args.len(),
                        loc: loc.clone(),
                    });
                }
                for (param, value) in func.params.iter().zip(args.into_iter()) {
                    self.scope.set_new(param.name.clone(), value);
                }
            }
            Some(idx) => {
                let before = &func.params[..idx];
                let after = &func.params[idx + 1..];
                if args.len() < before.len() + after.len() {
                    return Err(Error::Arity {
                        expected: before.len() + after.len(),
                        got: args.len(),
                        loc: loc.clone(),
                    });
                }
                let tail_start = args.len() - after.len();
                let middle: Vec<Value> = args[before.len()..tail_start].to_vec();
                for (param, value) in before.iter().zip(args[..before.len()].iter()) {
                    self.scope.set_new(param.name.clone(), value.clone());
                }
                self.scope
                    .set_new(func.params[idx].name.clone(), Value::new_list(middle));
                for (param, value) in after.iter().zip(args[tail_start..].iter()) {
                    self.scope.set_new(param.name.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    fn apply_arith(&self, op: ArithOp, left: &Value, right: &Value, loc: &Location) -> Result<Value> {
        use Value::*;

        // String concatenation/repetition (§4.1) take priority: `+` with
        // any non-nil right-hand side stringifies it, and `*` with an Int
        // repeats.
        if let (ArithOp::Add, String(a), b) = (op, left, right) {
            if !matches!(b, Nil) {
                return Ok(String(Rc::from(format!("{}{}", a, b.to_s()).as_str())));
            }
        }
        if let (ArithOp::Mul, String(a), Int(n)) = (op, left, right) {
            let count = (*n).max(0) as usize;
            return Ok(String(Rc::from(a.repeat(count).as_str())));
        }

        match (op, left, right) {
            (ArithOp::Add, Int(a), Int(b)) => Ok(Int(a + b)),
            (ArithOp::Add, Float(a), Float(b)) => Ok(Float(a + b)),
            (ArithOp::Add, Int(a), Float(b)) => Ok(Float(*a as f64 + b)),
            (ArithOp::Add, Float(a), Int(b)) => Ok(Float(a + *b as f64)),

            (ArithOp::Sub, Int(a), Int(b)) => Ok(Int(a - b)),
            (ArithOp::Sub, Float(a), Float(b)) => Ok(Float(a - b)),
            (ArithOp::Sub, Int(a), Float(b)) => Ok(Float(*a as f64 - b)),
            (ArithOp::Sub, Float(a), Int(b)) => Ok(Float(a - *b as f64)),

            (ArithOp::Mul, Int(a), Int(b)) => Ok(Int(a * b)),
            (ArithOp::Mul, Float(a), Float(b)) => Ok(Float(a * b)),
            (ArithOp::Mul, Int(a), Float(b)) => Ok(Float(*a as f64 * b)),
            (ArithOp::Mul, Float(a), Int(b)) => Ok(Float(a * *b as f64)),

            (ArithOp::Div, Int(_), Int(b)) if *b == 0 => {
                Err(Error::DivisionByZero { loc: loc.clone() })
            }
            (ArithOp::Div, Int(a), Int(b)) => Ok(Int(a / b)),
            (ArithOp::Div, Float(a), Float(b)) => Ok(Float(a / b)),
            (ArithOp::Div, Int(a), Float(b)) => Ok(Float(*a as f64 / b)),
            (ArithOp::Div, Float(a), Int(b)) => Ok(Float(a / *b as f64)),

            _ => Err(Error::UnsupportedOperation {
                op: op.to_string(),
                left: left.type_name(),
                right: right.type_name(),
                loc: loc.clone(),
            }),
        }
    }

    fn apply_relational(&self, op: RelOp, left: &Value, right: &Value, loc: &Location) -> Result<bool> {
        let (a, b) = match (left, right) {
            (Value::Int(a), Value::Int(b)) => (*a as f64, *b as f64),
            (Value::Float(a), Value::Float(b)) => (*a, *b),
            (Value::Int(a), Value::Float(b)) => (*a as f64, *b),
            (Value::Float(a), Value::Int(b)) => (*a, *b as f64),
            (Value::String(a), Value::String(b)) => {
                return Ok(match op {
                    RelOp::Lt => a.as_ref() < b.as_ref(),
                    RelOp::Le => a.as_ref() <= b.as_ref(),
                    RelOp::Gt => a.as_ref() > b.as_ref(),
                    RelOp::Ge => a.as_ref() >= b.as_ref(),
                })
            }
            _ => {
                return Err(Error::UnsupportedOperation {
                    op: op.to_string(),
                    left: left.type_name(),
                    right: right.type_name(),
                    loc: loc.clone(),
                })
            }
        };
        Ok(match op {
            RelOp::Lt => a < b,
            RelOp::Le => a <= b,
            RelOp::Gt => a > b,
            RelOp::Ge => a >= b,
        })
    }
}
