//! Accessor and constructor bodies
//!
//! Synthesized members carry short instruction sequences instead of native
//! code. The instruction set only covers what field-backed accessors and
//! forwarding constructors need:
//!
//! | Op          | Stack effect        | Description                              |
//! |-------------|---------------------|------------------------------------------|
//! | `LoadArg`   | `-> v`              | Push argument `n`                        |
//! | `LoadSlot`  | `-> v`              | Push slot `n` of the receiver            |
//! | `StoreSlot` | `v ->`              | Store into slot `n` of the receiver      |
//! | `CallBase`  | `a0..an ->`         | Run a parent constructor on the receiver |
//! | `Return`    | `[v] ->`            | Return top of stack, if any              |

use crate::class::Class;
use crate::error::{TypeError, TypeResult};
use crate::instance::Instance;
use crate::value::Value;

/// One instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Push argument `n`
    LoadArg(usize),
    /// Push slot `n` of the receiver
    LoadSlot(usize),
    /// Pop a value into slot `n` of the receiver
    StoreSlot(usize),
    /// Pop `argc` values and run parent constructor `constructor` with them
    CallBase {
        /// Constructor index on the parent class
        constructor: usize,
        /// Number of arguments to pass
        argc: usize,
    },
    /// Return the top of the stack (or nothing)
    Return,
}

/// `get_X`: read the backing slot
pub fn getter(slot: usize) -> Vec<Op> {
    vec![Op::LoadSlot(slot), Op::Return]
}

/// `set_X`: overwrite the backing slot
pub fn setter(slot: usize) -> Vec<Op> {
    vec![Op::LoadArg(0), Op::StoreSlot(slot), Op::Return]
}

/// Constructor that passes every argument, in order, to a parent constructor
pub fn forwarding_constructor(constructor: usize, argc: usize) -> Vec<Op> {
    let mut code: Vec<Op> = (0..argc).map(Op::LoadArg).collect();
    code.push(Op::CallBase { constructor, argc });
    code.push(Op::Return);
    code
}

/// Constructor that optionally runs a parameterless parent constructor, then
/// stores arguments into slots
pub fn storing_constructor(base: Option<usize>, assignments: &[(usize, usize)]) -> Vec<Op> {
    let mut code = Vec::with_capacity(assignments.len() * 2 + 2);
    if let Some(constructor) = base {
        code.push(Op::CallBase { constructor, argc: 0 });
    }
    for &(arg, slot) in assignments {
        code.push(Op::LoadArg(arg));
        code.push(Op::StoreSlot(slot));
    }
    code.push(Op::Return);
    code
}

/// The instance a body runs against
pub(crate) enum Receiver<'a> {
    /// Read-only access (getters)
    Shared(&'a Instance),
    /// Full access (setters, constructors)
    Exclusive(&'a mut Instance),
}

impl Receiver<'_> {
    fn instance(&self) -> &Instance {
        match self {
            Receiver::Shared(inst) => inst,
            Receiver::Exclusive(inst) => inst,
        }
    }
}

fn invalid(context: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidBytecode {
        context: context.to_string(),
        reason: reason.into(),
    }
}

/// Execute `code` declared on `owner` against `this`
pub(crate) fn execute(
    owner: &Class,
    context: &str,
    code: &[Op],
    mut this: Receiver<'_>,
    args: &[Value],
) -> TypeResult<Option<Value>> {
    let mut stack: Vec<Value> = Vec::with_capacity(4);

    for op in code {
        match *op {
            Op::LoadArg(index) => {
                let value = args
                    .get(index)
                    .cloned()
                    .ok_or_else(|| invalid(context, format!("argument {} out of range", index)))?;
                stack.push(value);
            }
            Op::LoadSlot(index) => {
                let value = this
                    .instance()
                    .slot(index)
                    .cloned()
                    .ok_or_else(|| invalid(context, format!("slot {} out of range", index)))?;
                stack.push(value);
            }
            Op::StoreSlot(index) => {
                let value = stack
                    .pop()
                    .ok_or_else(|| invalid(context, "stack underflow"))?;
                match &mut this {
                    Receiver::Exclusive(target) => target.store_slot(index, value)?,
                    Receiver::Shared(_) => {
                        return Err(invalid(context, "store through a read-only receiver"))
                    }
                }
            }
            Op::CallBase { constructor, argc } => {
                let parent = owner
                    .parent
                    .as_deref()
                    .ok_or_else(|| invalid(context, "base call on a class without parent"))?;
                let ctor = parent.constructors.get(constructor).ok_or_else(|| {
                    invalid(context, format!("parent constructor {} does not exist", constructor))
                })?;
                if stack.len() < argc {
                    return Err(invalid(context, "stack underflow"));
                }
                let base_args = stack.split_off(stack.len() - argc);
                let target = match &mut this {
                    Receiver::Exclusive(target) => &mut **target,
                    Receiver::Shared(_) => {
                        return Err(invalid(context, "base call through a read-only receiver"))
                    }
                };
                let base_context = format!("{}::.ctor", parent.name);
                execute(
                    parent,
                    &base_context,
                    &ctor.code,
                    Receiver::Exclusive(target),
                    &base_args,
                )?;
            }
            Op::Return => return Ok(stack.pop()),
        }
    }

    Ok(stack.pop())
}
