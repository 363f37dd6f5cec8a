use sym::SymbolicBitVec;

use crate::arch::Architecture;
use crate::block::{self, Block, BlockPoint};
use crate::instruction::ProgramPoint;
use crate::register::RegisterDesc;
use crate::vm::SymbolicVm;

/// Produces the symbolic value of a register at a program point.
pub trait Tracer<P: ProgramPoint> {
    type Arch: Architecture;

    fn architecture(&self) -> &Self::Arch;

    /// The value `register` holds right before the instruction at `point` executes.
    fn trace(&mut self, point: &P, register: &RegisterDesc) -> SymbolicBitVec;
}

/// Traces registers of a [Block] by replaying it from an unconstrained initial state.
///
/// The machine state before every instruction is kept, so tracing the same register at the same
/// point twice returns identical expressions.
#[derive(Debug, Clone)]
pub struct ReplayTracer<A: Architecture> {
    states: Vec<SymbolicVm<A>>,
    final_state: SymbolicVm<A>,
}

impl<A: Architecture + Clone> ReplayTracer<A> {
    pub fn new(arch: A, block: &Block) -> block::Result<Self> {
        let mut vm = SymbolicVm::new(arch);
        let mut states = Vec::with_capacity(block.len());
        for instruction in block.instructions() {
            states.push(vm.clone());
            vm.execute(instruction)?;
        }

        Ok(Self {
            states,
            final_state: vm,
        })
    }
}

impl<A: Architecture> ReplayTracer<A> {
    /// State before the instruction at `index`. The state at `index == block.len()` is the state
    /// after the whole block.
    pub fn state(&self, index: usize) -> Option<&SymbolicVm<A>> {
        if index == self.states.len() {
            Some(&self.final_state)
        } else {
            self.states.get(index)
        }
    }

    /// State after the whole block.
    pub fn final_state(&self) -> &SymbolicVm<A> {
        &self.final_state
    }
}

impl<'a, A: Architecture> Tracer<BlockPoint<'a>> for ReplayTracer<A> {
    type Arch = A;

    fn architecture(&self) -> &A {
        self.final_state.architecture()
    }

    fn trace(&mut self, point: &BlockPoint<'a>, register: &RegisterDesc) -> SymbolicBitVec {
        match self.state(point.index()) {
            Some(state) => state.read_register(register),
            None => {
                log::warn!(
                    "instruction {} was not replayed, tracing from the initial state",
                    point.index()
                );
                SymbolicBitVec::tagged(
                    register.base().tag(),
                    register.bit_offset() as usize,
                    register.bit_count() as usize,
                )
            }
        }
    }
}
