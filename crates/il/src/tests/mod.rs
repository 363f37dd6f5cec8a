use std::borrow::Cow;

use crate::arch::{amd64::*, Architecture, PartialWrite, RegisterId, RegisterTable};
use crate::register::RegisterDesc;

mod arch;
mod register;

/// Amd64 where frame pointer derived addresses are also known not to alias other restricted
/// bases.
#[derive(Debug, Clone, Copy, Default)]
struct FramedAmd64;

impl Architecture for FramedAmd64 {
    fn registers(&self) -> &RegisterTable {
        Amd64.registers()
    }

    fn register_name(&self, id: RegisterId) -> Cow<'static, str> {
        Amd64.register_name(id)
    }

    fn is_restricted(&self, base: RegisterId) -> bool {
        base == RSP || base == RBP
    }

    fn partial_write(&self, register: &RegisterDesc) -> PartialWrite {
        Amd64.partial_write(register)
    }
}

fn reg(id: RegisterId) -> RegisterDesc {
    RegisterDesc::from_register(Amd64.registers(), id).unwrap()
}
