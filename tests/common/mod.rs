use sym::SymbolicBitVec;
use symbolic_il::arch::amd64::register_from_name;
use symbolic_il::{Amd64, Architecture, Block, Opcode, Operand, RegisterDesc, SymbolicVm};

pub fn register(name: impl AsRef<str>) -> RegisterDesc {
    let name = name.as_ref();
    let id = register_from_name(name).unwrap_or_else(|| panic!("unknown register {name}"));
    RegisterDesc::from_register(Amd64.registers(), id).expect("failed to resolve register")
}

pub fn reg(name: impl AsRef<str>) -> Operand {
    Operand::Register(register(name))
}

/// Assembles a block from `(opcode, operands)` pairs.
pub fn assemble(instructions: impl IntoIterator<Item = (Opcode, Vec<Operand>)>) -> Block {
    let mut block = Block::new();
    for (opcode, operands) in instructions {
        block
            .emit(opcode, operands)
            .expect("failed to assemble instruction");
    }

    block
}

pub fn run(block: &Block) -> SymbolicVm<Amd64> {
    let mut vm = SymbolicVm::new(Amd64);
    for instruction in block.instructions() {
        vm.execute(instruction)
            .expect("failed to execute instruction");
    }

    vm
}

pub fn read_register<T>(vm: &SymbolicVm<Amd64>, name: impl AsRef<str>) -> T
where
    T: TryFrom<SymbolicBitVec>,
    <T as TryFrom<SymbolicBitVec>>::Error: std::fmt::Debug,
{
    T::try_from(vm.read_register(&register(name))).expect("register value is not concrete")
}
