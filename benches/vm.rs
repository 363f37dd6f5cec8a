use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sym::SymbolicBitVec;
use symbolic_il::arch::amd64::*;
use symbolic_il::{Amd64, Architecture, Instr, Opcode, Operand, RegisterDesc, SymbolicVm};

fn register(id: symbolic_il::RegisterId) -> RegisterDesc {
    RegisterDesc::from_register(Amd64.registers(), id).expect("register is in the table")
}

fn setup_vm() -> SymbolicVm<Amd64> {
    let mut vm = SymbolicVm::new(Amd64);
    vm.write_register(
        &register(RAX),
        SymbolicBitVec::constant(0xAABBCCDDEEFF0011, 64),
    );
    vm
}

fn setup_stack() -> (SymbolicVm<Amd64>, Vec<Instr>) {
    let rsp = Operand::Register(register(RSP));
    let instructions = [
        (Opcode::Sub, vec![rsp, Operand::imm(16)]),
        (
            Opcode::Str,
            vec![rsp, Operand::imm(0), Operand::Register(register(RBX))],
        ),
        (
            Opcode::Str,
            vec![rsp, Operand::imm(8), Operand::Register(register(RCX))],
        ),
        (
            Opcode::Ldd,
            vec![Operand::Register(register(RDX)), rsp, Operand::imm(4)],
        ),
    ]
    .into_iter()
    .map(|(opcode, operands)| Instr::new(opcode, operands).expect("valid instruction"))
    .collect();

    (SymbolicVm::new(Amd64), instructions)
}

pub fn symbolic_vm(c: &mut Criterion) {
    c.bench_function("write_full_register", |b| {
        b.iter_batched(
            setup_vm,
            |mut vm| vm.write_register(&register(RBX), SymbolicBitVec::constant(1, 64)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("write_high_byte", |b| {
        b.iter_batched(
            setup_vm,
            |mut vm| vm.write_register(&register(AH), SymbolicBitVec::constant(0xFF, 8)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("write_unbound_word", |b| {
        b.iter_batched(
            setup_vm,
            |mut vm| vm.write_register(&register(DX), SymbolicBitVec::with_size(16)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("read_sub_register", |b| {
        b.iter_batched(
            setup_vm,
            |vm| vm.read_register(&register(AX)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("stack_frame", |b| {
        b.iter_batched(
            setup_stack,
            |(mut vm, instructions)| {
                for instruction in &instructions {
                    vm.execute(instruction)
                        .expect("failed to execute instruction");
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, symbolic_vm);
criterion_main!(benches);
